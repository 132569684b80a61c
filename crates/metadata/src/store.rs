//! Metadata store trait and SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::models::FileRow;
use crate::repos::FileRepo;
use async_trait::async_trait;
use depot_core::Tier;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use time::OffsetDateTime;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: FileRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store, running migrations.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection avoids
            // persistent "database is locked" failures under handler concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

/// True when the error is SQLite's UNIQUE constraint violation on the
/// filename column.
fn is_filename_conflict(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            db_err.message().contains("UNIQUE constraint")
                && db_err.message().contains("files.filename")
        }
        _ => false,
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl FileRepo for SqliteStore {
    async fn insert_file(
        &self,
        filename: &str,
        content_hash: &str,
        size_bytes: i64,
        created_at: OffsetDateTime,
    ) -> MetadataResult<FileRow> {
        let result = sqlx::query(
            "INSERT INTO files (filename, content_hash, size_bytes, tier, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(filename)
        .bind(content_hash)
        .bind(size_bytes)
        .bind(Tier::Cache.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_filename_conflict(&e) {
                MetadataError::AlreadyExists(filename.to_string())
            } else {
                e.into()
            }
        })?;

        Ok(FileRow {
            id: result.last_insert_rowid(),
            filename: filename.to_string(),
            content_hash: content_hash.to_string(),
            size_bytes,
            tier: Tier::Cache.as_str().to_string(),
            created_at,
        })
    }

    async fn get_file_by_name(&self, filename: &str) -> MetadataResult<Option<FileRow>> {
        let row = sqlx::query_as::<_, FileRow>(
            "SELECT id, filename, content_hash, size_bytes, tier, created_at \
             FROM files WHERE filename = ?",
        )
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_file_by_hash(&self, content_hash: &str) -> MetadataResult<Option<FileRow>> {
        let row = sqlx::query_as::<_, FileRow>(
            "SELECT id, filename, content_hash, size_bytes, tier, created_at \
             FROM files WHERE content_hash = ? LIMIT 1",
        )
        .bind(content_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_files(&self) -> MetadataResult<Vec<FileRow>> {
        let rows = sqlx::query_as::<_, FileRow>(
            "SELECT id, filename, content_hash, size_bytes, tier, created_at \
             FROM files ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_tier(&self, filename: &str, tier: Tier) -> MetadataResult<()> {
        let result = sqlx::query("UPDATE files SET tier = ? WHERE filename = ?")
            .bind(tier.as_str())
            .bind(filename)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(filename.to_string()));
        }
        Ok(())
    }

    async fn delete_file(&self, filename: &str) -> MetadataResult<()> {
        let result = sqlx::query("DELETE FROM files WHERE filename = ?")
            .bind(filename)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(filename.to_string()));
        }
        Ok(())
    }
}

/// SQLite schema (embedded).
const SCHEMA_SQL: &str = r#"
-- Files table: one row per stored file; tier tracks which root holds the bytes.
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL UNIQUE,
    content_hash TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    tier TEXT NOT NULL DEFAULT 'cache',
    created_at TEXT NOT NULL
);

-- Dedup lookups are by content hash.
CREATE INDEX IF NOT EXISTS idx_files_content_hash ON files(content_hash);
"#;
