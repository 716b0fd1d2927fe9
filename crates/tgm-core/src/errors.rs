/// Core error type.
///
/// Adapter crates map their specific failures into this type so callers can tell
/// configuration mistakes apart from platform faults.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("platform fault: {0}")]
    Platform(#[from] Fault),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A fault raised by the remote platform client.
///
/// Adapters translate their RPC errors into one of these tags; the message is the
/// platform's own text and is what the classifier scans for wait hints.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    /// The account is sending too many requests to peers.
    #[error("peer flood: {message}")]
    PeerFlood { message: String },

    /// The platform demands a cooldown before the next request.
    #[error("flood wait ({seconds}s): {message}")]
    FloodWait { seconds: u64, message: String },

    /// The target user's privacy settings forbid the action.
    #[error("privacy restricted: {message}")]
    PrivacyRestricted { message: String },

    /// The session is no longer usable (revoked key, deactivated account).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Other { message: String },
}

impl Fault {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Fault::PeerFlood { message }
            | Fault::FloodWait { message, .. }
            | Fault::PrivacyRestricted { message }
            | Fault::Unauthorized { message }
            | Fault::Other { message } => message,
        }
    }
}
