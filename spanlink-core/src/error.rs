//! Error types for spanlink-core.

use thiserror::Error;

use crate::annotation::AnnotationId;

/// Result type for spanlink-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for spanlink-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A span whose begin lies after its end.
    #[error("Invalid span: begin {begin} is after end {end}")]
    InvalidSpan {
        /// Requested begin offset
        begin: usize,
        /// Requested end offset
        end: usize,
    },

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An annotation id the store does not know.
    #[error("Unknown annotation: {0}")]
    UnknownAnnotation(AnnotationId),
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
