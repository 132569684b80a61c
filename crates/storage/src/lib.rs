//! Physical file storage for the depot file service.
//!
//! This crate provides:
//! - [`TierStore`]: flat-file storage across the two tier roots (cache and
//!   bulk storage) with atomic writes and durable cross-tier copies
//! - Bounded-chunk streaming reads for large files

pub mod error;
pub mod tiers;

pub use error::{StorageError, StorageResult};
pub use tiers::{ByteStream, EntryMeta, TierStore};
