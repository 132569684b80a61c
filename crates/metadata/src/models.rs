//! Database models mapping to the metadata schema.

use depot_core::Tier;
use sqlx::FromRow;
use time::OffsetDateTime;

/// One stored file: the authoritative record of where its bytes live.
#[derive(Debug, Clone, FromRow)]
pub struct FileRow {
    pub id: i64,
    /// Logical name, unique across all records; possibly suffix-versioned.
    pub filename: String,
    /// Lowercase hex SHA-256 of the file content.
    pub content_hash: String,
    pub size_bytes: i64,
    /// Which tier currently holds the bytes ("cache" or "storage").
    pub tier: String,
    pub created_at: OffsetDateTime,
}

impl FileRow {
    /// Parse the persisted tier column.
    pub fn current_tier(&self) -> depot_core::Result<Tier> {
        Tier::parse(&self.tier)
    }
}
