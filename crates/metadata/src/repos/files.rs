//! File record repository.

use crate::error::MetadataResult;
use crate::models::FileRow;
use async_trait::async_trait;
use depot_core::Tier;
use time::OffsetDateTime;

/// Repository for file record operations.
#[async_trait]
pub trait FileRepo: Send + Sync {
    /// Insert a new file record in the cache tier.
    ///
    /// Uniqueness on `filename` is enforced by the insert itself; a taken
    /// name returns [`MetadataError::AlreadyExists`](crate::MetadataError::AlreadyExists)
    /// with no separate exists-check, so exactly one of any set of
    /// concurrent same-name inserts wins.
    async fn insert_file(
        &self,
        filename: &str,
        content_hash: &str,
        size_bytes: i64,
        created_at: OffsetDateTime,
    ) -> MetadataResult<FileRow>;

    /// Get a file record by logical name.
    async fn get_file_by_name(&self, filename: &str) -> MetadataResult<Option<FileRow>>;

    /// Get any file record with the given content hash.
    ///
    /// This is the dedup oracle: a hit means identical content is already
    /// stored and ingest must not create a second physical copy.
    async fn get_file_by_hash(&self, content_hash: &str) -> MetadataResult<Option<FileRow>>;

    /// List all file records, newest first.
    async fn list_files(&self) -> MetadataResult<Vec<FileRow>>;

    /// Update the tier of a file record.
    ///
    /// Returns `NotFound` when no record has that name.
    async fn set_tier(&self, filename: &str, tier: Tier) -> MetadataResult<()>;

    /// Delete a file record.
    ///
    /// Returns `NotFound` when no record has that name.
    async fn delete_file(&self, filename: &str) -> MetadataResult<()>;
}
