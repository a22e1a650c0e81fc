use std::fmt;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for SDK operations. Tool-facing code converts this into a
/// [`replay_types::ToolErrorResponse`] via [`crate::envelope`]; library
/// callers can match on it directly.
#[derive(Debug)]
pub enum Error {
    NotFound(String),
    InvalidInput(String),
    Runtime(replay_runtime::Error),
    Core(replay_core::Error),
    Serde(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(msg) => write!(f, "not found: {}", msg),
            Error::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            Error::Runtime(err) => write!(f, "{}", err),
            Error::Core(err) => write!(f, "{}", err),
            Error::Serde(err) => write!(f, "serialization error: {}", err),
            Error::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Runtime(err) => Some(err),
            Error::Core(err) => Some(err),
            Error::Serde(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::NotFound(_) | Error::InvalidInput(_) => None,
        }
    }
}

impl From<replay_runtime::Error> for Error {
    fn from(err: replay_runtime::Error) -> Self {
        match err {
            replay_runtime::Error::InvalidQuery(msg) => Error::InvalidInput(msg),
            other => Error::Runtime(other),
        }
    }
}

impl From<replay_core::Error> for Error {
    fn from(err: replay_core::Error) -> Self {
        Error::Core(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
