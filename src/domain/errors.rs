use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GracefulError {
    Bind { addr: String, reason: String },
    Accept(String),
    ServerClosed,
    AlreadyServing,
    Signal(String),
    Config(String),
}

impl GracefulError {
    /// True when serving stopped because the listener was closed on purpose.
    pub fn is_server_closed(&self) -> bool {
        matches!(self, GracefulError::ServerClosed)
    }
}

impl fmt::Display for GracefulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GracefulError::Bind { addr, reason } => write!(f, "Failed to bind {}: {}", addr, reason),
            GracefulError::Accept(msg) => write!(f, "Accept failed: {}", msg),
            GracefulError::ServerClosed => write!(f, "Server closed"),
            GracefulError::AlreadyServing => write!(f, "Listener is already being served"),
            GracefulError::Signal(msg) => write!(f, "Signal registration failed: {}", msg),
            GracefulError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for GracefulError {}

pub type Result<T> = std::result::Result<T, GracefulError>;
