//! IRC registration command builder.

use std::fmt;

/// IRC command emitted during logon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// PASS - Connection password
    Pass {
        /// Server password
        password: String,
    },
    /// NICK - Requested nickname
    Nick {
        /// Nickname
        nickname: String,
    },
    /// USER - User registration
    User {
        /// Identity (username)
        identity: String,
        /// Hostname the client claims to come from
        hostname: String,
        /// Host of the server, as seen in the connection URI
        server: String,
        /// Real name (GECOS)
        realname: String,
    },
    /// STARTTLS - Upgrade to TLS
    StartTls,
    /// QUIT - Close connection
    Quit {
        /// Optional quit message
        message: Option<String>,
    },
}

/// Formats the command as a single logical line, without line termination.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass { password } => write!(f, "PASS {}", Clean(password)),
            Self::Nick { nickname } => write!(f, "NICK {}", Clean(nickname)),
            Self::User {
                identity,
                hostname,
                server,
                realname,
            } => write!(
                f,
                "USER {} {} {} :{}",
                Clean(identity),
                Clean(hostname),
                Clean(server),
                Clean(realname)
            ),
            Self::StartTls => f.write_str("STARTTLS"),
            Self::Quit { message } => match message.as_deref() {
                Some(text) if !text.is_empty() => write!(f, "QUIT :{}", Clean(text)),
                _ => f.write_str("QUIT"),
            },
        }
    }
}

/// Writes a parameter with control characters removed.
struct Clean<'a>(&'a str);

impl fmt::Display for Clean<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in self.0.split(char::is_control) {
            f.write_str(part)?;
        }
        Ok(())
    }
}
