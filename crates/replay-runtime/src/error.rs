use std::fmt;

/// Result type for replay-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while running the backfill or comparison
/// services
#[derive(Debug)]
pub enum Error {
    Index(replay_index::Error),
    Provider(replay_providers::Error),
    Engine(replay_engine::Error),
    Core(replay_core::Error),
    Serde(serde_json::Error),

    /// The caller-supplied query DSL was invalid (spec §6.4).
    InvalidQuery(String),

    /// The comparison ran in strict mode and found mismatches
    /// (`ReplayComparisonError`, spec §4.F step 10).
    ComparisonFailed(Box<replay_types::ComparisonResult>),

    /// A running job observed its cancellation token.
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Index(err) => write!(f, "index error: {}", err),
            Error::Provider(err) => write!(f, "provider error: {}", err),
            Error::Engine(err) => write!(f, "engine error: {}", err),
            Error::Core(err) => write!(f, "core error: {}", err),
            Error::Serde(err) => write!(f, "serialization error: {}", err),
            Error::InvalidQuery(msg) => write!(f, "invalid query: {}", msg),
            Error::ComparisonFailed(result) => {
                write!(f, "comparison failed with {} anomalies", result.anomalies.len())
            }
            Error::Cancelled => write!(f, "operation cancelled"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Index(err) => Some(err),
            Error::Provider(err) => Some(err),
            Error::Engine(err) => Some(err),
            Error::Core(err) => Some(err),
            Error::Serde(err) => Some(err),
            Error::InvalidQuery(_) | Error::ComparisonFailed(_) | Error::Cancelled => None,
        }
    }
}

impl From<replay_index::Error> for Error {
    fn from(err: replay_index::Error) -> Self {
        Error::Index(err)
    }
}

impl From<replay_providers::Error> for Error {
    fn from(err: replay_providers::Error) -> Self {
        Error::Provider(err)
    }
}

impl From<replay_engine::Error> for Error {
    fn from(err: replay_engine::Error) -> Self {
        Error::Engine(err)
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
