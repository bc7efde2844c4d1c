//! Core logon types.

mod numeric;
mod uri;

pub use numeric::Numeric;
pub use uri::{SECURE_SCHEME, TargetUri, UriParser, UrlParser};
