//! Error types for spanlink.

use thiserror::Error;

/// Result type for spanlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for spanlink operations.
///
/// Alignment misses (an annotation without a span, a mention matching no
/// existing annotation, an ambiguous relation argument) are not errors: they
/// are logged and skipped. Only configuration problems, engine failures and
/// malformed projection input surface here.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid configuration, reported at construction time.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The engine failed to build or to annotate a document.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Store contents that cannot be projected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error (reading settings files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the core data model.
    #[error(transparent)]
    Core(#[from] spanlink_core::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an engine error.
    pub fn engine(msg: impl Into<String>) -> Self {
        Error::Engine(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(format!("invalid settings: {}", err))
    }
}
