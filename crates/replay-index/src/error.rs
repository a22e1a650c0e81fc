use std::fmt;

/// Result type for replay-index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the timeline store layer
#[derive(Debug)]
pub enum Error {
    /// IO operation failed (file store only)
    Io(std::io::Error),

    /// A stored record failed to (de)serialize
    Serde(serde_json::Error),

    /// Query-specific error (invalid input, etc.)
    Query(String),

    /// A page was rejected because its computed `projection_hash` did not
    /// match the one supplied on the record (append invariant)
    HashMismatch { expected: String, observed: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Serde(err) => write!(f, "serialization error: {}", err),
            Error::Query(msg) => write!(f, "query error: {}", msg),
            Error::HashMismatch { expected, observed } => {
                write!(f, "projection hash mismatch: expected {expected}, got {observed}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Serde(err) => Some(err),
            Error::Query(_) | Error::HashMismatch { .. } => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}
