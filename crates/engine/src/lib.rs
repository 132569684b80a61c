//! Tiered-storage engine for the depot file service.
//!
//! [`Depot`] is the context object handlers work against: it owns the
//! metadata store, the physical tier store, and the migration queue, and
//! exposes the ingest and retrieval operations. Consistency protocol:
//! bytes land durably in the cache tier before a metadata row exists, the
//! migration worker makes the bulk copy durable before flipping the tier
//! column, and deletes remove the physical file before the row.

pub mod error;
pub mod ingest;
pub mod migration;
pub mod retrieval;

pub use error::{EngineError, EngineResult};
pub use migration::MigrationQueue;

use depot_metadata::MetadataStore;
use depot_storage::TierStore;
use std::sync::Arc;

/// The tiered-storage engine: one instance constructed at startup and
/// shared by every request handler.
pub struct Depot {
    metadata: Arc<dyn MetadataStore>,
    tiers: Arc<TierStore>,
    queue: Arc<MigrationQueue>,
    max_upload_bytes: u64,
}

impl Depot {
    /// Create a new engine context.
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        tiers: Arc<TierStore>,
        queue: Arc<MigrationQueue>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            metadata,
            tiers,
            queue,
            max_upload_bytes,
        }
    }

    /// The metadata store.
    pub fn metadata(&self) -> &Arc<dyn MetadataStore> {
        &self.metadata
    }

    /// The physical tier store.
    pub fn tiers(&self) -> &Arc<TierStore> {
        &self.tiers
    }

    /// The migration queue.
    pub fn queue(&self) -> &Arc<MigrationQueue> {
        &self.queue
    }

    /// Maximum accepted upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }
}
