//! Engine error types.

use depot_metadata::MetadataError;
use depot_storage::StorageError;
use thiserror::Error;

/// Errors surfaced by ingest and retrieval operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid filename: {0}")]
    InvalidName(String),

    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("duplicate content: identical bytes already stored as {existing}")]
    DuplicateContent { existing: String },

    #[error("no free name variant for {0}")]
    NameExhausted(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
