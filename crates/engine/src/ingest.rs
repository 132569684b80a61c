//! Upload ingest pipeline.

use crate::Depot;
use crate::error::{EngineError, EngineResult};
use bytes::Bytes;
use depot_core::{ContentHash, Tier, sanitize_filename};
use depot_metadata::{FileRepo, FileRow, MetadataError};
use time::OffsetDateTime;

/// Cap on collision-suffix probing per upload.
const MAX_NAME_ATTEMPTS: u32 = 100;

impl Depot {
    /// Store an uploaded payload.
    ///
    /// Validates, sanitizes, dedups by content hash, resolves name
    /// collisions with `_(n)` suffixes, writes the bytes durably to the
    /// cache tier, enqueues the migration (best-effort), and records the
    /// metadata row. Any failure before the cache-tier write aborts with
    /// zero side effects.
    pub async fn store_file(&self, proposed_name: &str, data: Bytes) -> EngineResult<FileRow> {
        let size = data.len() as u64;
        if size > self.max_upload_bytes() {
            return Err(EngineError::PayloadTooLarge {
                size,
                max: self.max_upload_bytes(),
            });
        }

        let base = sanitize_filename(proposed_name)
            .map_err(|e| EngineError::InvalidName(e.to_string()))?;

        // The hash is always recomputed from the payload, never trusted
        // from the caller.
        let hash = ContentHash::compute(&data).to_hex();

        if let Some(existing) = self.metadata().get_file_by_hash(&hash).await? {
            return Err(EngineError::DuplicateContent {
                existing: existing.filename,
            });
        }

        let mut attempt = 0u32;
        loop {
            if attempt >= MAX_NAME_ATTEMPTS {
                return Err(EngineError::NameExhausted(base));
            }
            let candidate = if attempt == 0 {
                base.clone()
            } else {
                format!("{base}_({attempt})")
            };
            attempt += 1;

            if self
                .metadata()
                .get_file_by_name(&candidate)
                .await?
                .is_some()
            {
                continue;
            }

            self.tiers().put(Tier::Cache, &candidate, data.clone()).await?;

            // Best-effort: a full queue or a failed stat does not undo the
            // write; the file stays resident in the cache tier.
            match self.queue().enqueue(&candidate).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::info!(name = %candidate, "migration queue full; file stays in cache tier");
                }
                Err(e) => {
                    tracing::warn!(name = %candidate, error = %e, "migration enqueue failed");
                }
            }

            match self
                .metadata()
                .insert_file(&candidate, &hash, size as i64, OffsetDateTime::now_utc())
                .await
            {
                Ok(row) => {
                    tracing::info!(name = %row.filename, size, "file stored in cache tier");
                    return Ok(row);
                }
                Err(MetadataError::AlreadyExists(_)) => {
                    // A concurrent upload claimed the name between probe and
                    // insert; the insert is the arbiter. Move on to the next
                    // suffix.
                    tracing::warn!(name = %candidate, "lost name race after write; probing next suffix");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
