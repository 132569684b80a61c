//! Download, delete, info, and listing operations.

use crate::Depot;
use crate::error::{EngineError, EngineResult};
use depot_core::Tier;
use depot_core::api::FileEntry;
use depot_metadata::{FileRepo, FileRow, MetadataError};
use depot_storage::{ByteStream, StorageError};

fn tier_of(record: &FileRow) -> EngineResult<Tier> {
    record
        .current_tier()
        .map_err(|e| EngineError::Internal(format!("corrupt tier column: {e}")))
}

impl Depot {
    /// Sanitize a requested name and look up its record.
    async fn resolve(&self, requested: &str) -> EngineResult<FileRow> {
        let name = depot_core::sanitize_filename(requested)
            .map_err(|e| EngineError::InvalidName(e.to_string()))?;
        self.metadata()
            .get_file_by_name(&name)
            .await?
            .ok_or(EngineError::NotFound(name))
    }

    /// Open a download stream for a file.
    ///
    /// Returns the record (for size and disposition headers) and the byte
    /// stream. A concurrent migration may flip the tier between lookup and
    /// open; one re-lookup covers that window, so downloads succeed with
    /// correct bytes regardless of the observed tier.
    pub async fn open_download(&self, requested: &str) -> EngineResult<(FileRow, ByteStream)> {
        let record = self.resolve(requested).await?;
        let tier = tier_of(&record)?;

        match self.tiers().get_stream(tier, &record.filename).await {
            Ok(stream) => Ok((record, stream)),
            Err(StorageError::NotFound(_)) => {
                let fresh = self
                    .metadata()
                    .get_file_by_name(&record.filename)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(record.filename.clone()))?;
                let fresh_tier = tier_of(&fresh)?;
                match self.tiers().get_stream(fresh_tier, &fresh.filename).await {
                    Ok(stream) => Ok((fresh, stream)),
                    Err(StorageError::NotFound(_)) => {
                        tracing::error!(
                            name = %fresh.filename,
                            tier = %fresh.tier,
                            "consistency anomaly: metadata names a tier with no physical file"
                        );
                        Err(EngineError::NotFound(fresh.filename))
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a file: physical bytes first, then the metadata row.
    ///
    /// Returns the resolved name. A physically missing file is logged as an
    /// anomaly and treated as already removed so the row still gets cleaned
    /// up.
    pub async fn delete_file(&self, requested: &str) -> EngineResult<String> {
        let record = self.resolve(requested).await?;
        let tier = tier_of(&record)?;

        match self.tiers().delete(tier, &record.filename).await {
            Ok(()) => {}
            Err(StorageError::NotFound(_)) => {
                // The migration worker may have flipped the tier since the
                // lookup; retry at the fresh tier before calling it an
                // anomaly.
                let fresh = self.metadata().get_file_by_name(&record.filename).await?;
                let retried = match &fresh {
                    Some(fresh) if fresh.tier != record.tier => {
                        let fresh_tier = tier_of(fresh)?;
                        self.tiers().delete(fresh_tier, &fresh.filename).await
                    }
                    _ => Err(StorageError::NotFound(record.filename.clone())),
                };
                match retried {
                    Ok(()) => {}
                    Err(StorageError::NotFound(_)) => {
                        tracing::warn!(
                            name = %record.filename,
                            tier = %record.tier,
                            "physical file already missing at delete; removing metadata row"
                        );
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            // Physical removal failed, so the row stays: never leave a
            // metadata row pointing at bytes that were removed, nor orphan
            // bytes without a row.
            Err(e) => return Err(e.into()),
        }

        match self.metadata().delete_file(&record.filename).await {
            Ok(()) => Ok(record.filename),
            Err(MetadataError::NotFound(_)) => Err(EngineError::NotFound(record.filename)),
            Err(e) => Err(e.into()),
        }
    }

    /// Report name, size, and modification time for a file.
    pub async fn file_info(&self, requested: &str) -> EngineResult<FileEntry> {
        let record = self.resolve(requested).await?;
        let tier = tier_of(&record)?;

        let meta = match self.tiers().head(tier, &record.filename).await {
            Ok(meta) => meta,
            Err(StorageError::NotFound(_)) => {
                let fresh = self
                    .metadata()
                    .get_file_by_name(&record.filename)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(record.filename.clone()))?;
                let fresh_tier = tier_of(&fresh)?;
                match self.tiers().head(fresh_tier, &fresh.filename).await {
                    Ok(meta) => meta,
                    Err(StorageError::NotFound(_)) => {
                        tracing::error!(
                            name = %fresh.filename,
                            tier = %fresh.tier,
                            "consistency anomaly: metadata names a tier with no physical file"
                        );
                        return Err(EngineError::NotFound(fresh.filename));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Err(e) => return Err(e.into()),
        };

        Ok(FileEntry {
            name: record.filename,
            size: record.size_bytes as u64,
            modified: meta
                .modified
                .map(|t| t.unix_timestamp())
                .unwrap_or_else(|| record.created_at.unix_timestamp()),
        })
    }

    /// List all stored files, newest first.
    ///
    /// Listing is metadata-driven: it never walks the filesystem, and
    /// `modified` is the record creation time.
    pub async fn list_files(&self) -> EngineResult<Vec<FileEntry>> {
        let rows = self.metadata().list_files().await?;
        Ok(rows
            .into_iter()
            .map(|row| FileEntry {
                modified: row.created_at.unix_timestamp(),
                name: row.filename,
                size: row.size_bytes as u64,
            })
            .collect())
    }
}
