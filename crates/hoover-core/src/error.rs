use thiserror::Error;

/// Top-level error type for the Hoover service.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for HooverError` so that `?` works across crate
/// boundaries in the composition root.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HooverError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vocabulary error: {0}")]
    Vocabulary(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for HooverError {
    fn from(err: toml::de::Error) -> Self {
        HooverError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for HooverError {
    fn from(err: serde_json::Error) -> Self {
        HooverError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Hoover operations.
pub type Result<T> = std::result::Result<T, HooverError>;
