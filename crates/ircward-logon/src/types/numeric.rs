//! IRC numeric reply codes relevant to logon.

/// IRC numeric reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Numeric(u16);

impl Numeric {
    /// Creates a new numeric.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Parses a three-digit numeric as it appears on the wire.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        if token.len() != 3 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        token.parse().ok().map(Self)
    }
}

impl std::fmt::Display for Numeric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

// Numerics seen during registration
impl Numeric {
    /// 001 Welcome, registration complete
    pub const RPL_WELCOME: Self = Self(1);
    /// 670 STARTTLS successful, proceed with TLS handshake
    pub const RPL_STARTTLS: Self = Self(670);
    /// 691 STARTTLS failed
    pub const ERR_STARTTLS: Self = Self(691);
}
