//! Error types for refmerge-core.

use crate::ReferentId;
use thiserror::Error;

/// Result type for refmerge-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for refmerge-core operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A handle that no longer resolves in the arena.
    #[error("Unknown referent: {0}")]
    UnknownReferent(ReferentId),
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
