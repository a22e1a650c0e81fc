use std::fmt;

/// Result type for replay-engine operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// JSON (de)serialization failed while folding canonical JSON
    Serde(serde_json::Error),

    /// Core canonicalisation/hashing failure
    Core(replay_core::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Serde(err) => write!(f, "serialization error: {}", err),
            Error::Core(err) => write!(f, "core error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Serde(err) => Some(err),
            Error::Core(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<replay_core::Error> for Error {
    fn from(err: replay_core::Error) -> Self {
        Error::Core(err)
    }
}
