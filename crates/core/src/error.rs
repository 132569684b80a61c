//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid tier: {0}")]
    InvalidTier(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
