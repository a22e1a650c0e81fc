use std::fmt;

/// Result type for replay-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the canonicalisation/hashing layer
#[derive(Debug)]
pub enum Error {
    /// The input value could not be canonicalised (e.g. NaN/Infinity in a number)
    Canonicalisation(String),

    /// JSON (de)serialization failed
    Serde(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Canonicalisation(msg) => write!(f, "canonicalisation error: {}", msg),
            Error::Serde(err) => write!(f, "serialization error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Canonicalisation(_) => None,
            Error::Serde(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}
