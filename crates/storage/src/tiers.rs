//! Flat filesystem storage across the two tier roots.

use crate::error::{StorageError, StorageResult};
use bytes::Bytes;
use depot_core::Tier;
use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use time::OffsetDateTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

/// Default chunk size for streaming reads (64 KiB).
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// A stream of file bytes in bounded chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Metadata for a stored file.
#[derive(Debug, Clone)]
pub struct EntryMeta {
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, when the filesystem reports one.
    pub modified: Option<OffsetDateTime>,
}

/// Flat file storage over the cache and bulk-storage roots.
///
/// Files live directly under the root of their tier, named by resolved
/// logical name. Writes go through a unique temp file, fsync, and an atomic
/// rename, so a reader never observes a partially written file.
pub struct TierStore {
    cache_root: PathBuf,
    storage_root: PathBuf,
}

impl TierStore {
    /// Create a new tier store, creating both roots if missing.
    pub async fn new(
        cache_root: impl AsRef<Path>,
        storage_root: impl AsRef<Path>,
    ) -> StorageResult<Self> {
        let cache_root = cache_root.as_ref().to_path_buf();
        let storage_root = storage_root.as_ref().to_path_buf();
        fs::create_dir_all(&cache_root).await?;
        fs::create_dir_all(&storage_root).await?;
        Ok(Self {
            cache_root,
            storage_root,
        })
    }

    /// The root directory of a tier.
    pub fn root(&self, tier: Tier) -> &Path {
        match tier {
            Tier::Cache => &self.cache_root,
            Tier::Storage => &self.storage_root,
        }
    }

    /// Resolve a name to its path within a tier root.
    ///
    /// Names are flat by construction (sanitized upstream); anything that
    /// could leave the root is rejected here again before touching the
    /// filesystem.
    fn entry_path(&self, tier: Tier, name: &str) -> StorageResult<PathBuf> {
        if name.is_empty() || name == "." || name == ".." {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(StorageError::InvalidName(format!(
                "name must be a flat file name: {name}"
            )));
        }
        Ok(self.root(tier).join(name))
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, tier: Tier, name: &str) -> StorageResult<bool> {
        let path = self.entry_path(tier, name)?;
        fs::try_exists(&path).await.map_err(StorageError::Io)
    }

    #[instrument(skip(self))]
    pub async fn head(&self, tier: Tier, name: &str) -> StorageResult<EntryMeta> {
        let path = self.entry_path(tier, name)?;
        let metadata = fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(name.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;

        Ok(EntryMeta {
            size: metadata.len(),
            modified: metadata.modified().ok().map(|t| t.into()),
        })
    }

    /// Read a whole file into memory. Prefer [`TierStore::get_stream`] for
    /// request-path reads.
    #[instrument(skip(self))]
    pub async fn get(&self, tier: Tier, name: &str) -> StorageResult<Bytes> {
        let path = self.entry_path(tier, name)?;
        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(name.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    /// Open a file as a bounded-chunk stream.
    #[instrument(skip(self))]
    pub async fn get_stream(&self, tier: Tier, name: &str) -> StorageResult<ByteStream> {
        use tokio::io::AsyncReadExt;

        let path = self.entry_path(tier, name)?;
        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(name.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;

        // Stream the file in chunks instead of loading entirely into memory
        let stream = async_stream::try_stream! {
            let mut file = file;
            let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
            loop {
                let n = file.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                yield Bytes::copy_from_slice(&buf[..n]);
            }
        };

        Ok(Box::pin(stream))
    }

    /// Write a file into a tier.
    ///
    /// The tier root must already exist; the bytes go through a unique temp
    /// file, `sync_all`, and an atomic rename.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn put(&self, tier: Tier, name: &str, data: Bytes) -> StorageResult<()> {
        let path = self.entry_path(tier, name)?;
        self.check_root(tier).await?;

        let temp_path = temp_sibling(&path);
        {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&data).await?;
            // Ensure data is flushed to disk before rename
            file.sync_all().await?;
        }
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }

    /// Copy a file between tiers, durably.
    ///
    /// The destination goes through a temp file and `sync_all` before the
    /// final rename, so when this returns the destination copy is fully
    /// durable. Returns the number of bytes copied.
    #[instrument(skip(self))]
    pub async fn copy_across(&self, from: Tier, to: Tier, name: &str) -> StorageResult<u64> {
        let from_path = self.entry_path(from, name)?;
        let to_path = self.entry_path(to, name)?;
        self.check_root(to).await?;

        let mut src = fs::File::open(&from_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(name.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;

        let temp_path = temp_sibling(&to_path);
        let copied = {
            let mut dst = fs::File::create(&temp_path).await?;
            let copied = match tokio::io::copy(&mut src, &mut dst).await {
                Ok(n) => n,
                Err(e) => {
                    drop(dst);
                    let _ = fs::remove_file(&temp_path).await;
                    return Err(StorageError::Io(e));
                }
            };
            dst.sync_all().await?;
            copied
        };
        fs::rename(&temp_path, &to_path).await?;

        Ok(copied)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, tier: Tier, name: &str) -> StorageResult<()> {
        let path = self.entry_path(tier, name)?;
        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(name.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(())
    }

    /// Verify both tier roots exist and are directories.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> StorageResult<()> {
        for tier in [Tier::Cache, Tier::Storage] {
            self.check_root(tier).await?;
        }
        Ok(())
    }

    /// Verify a tier root exists before committing a write into it.
    async fn check_root(&self, tier: Tier) -> StorageResult<()> {
        let root = self.root(tier);
        let metadata = fs::metadata(root).await.map_err(|e| {
            StorageError::Io(std::io::Error::new(
                e.kind(),
                format!("{tier} root not accessible: {e}"),
            ))
        })?;
        if !metadata.is_dir() {
            return Err(StorageError::Config(format!(
                "{tier} root is not a directory: {}",
                root.display()
            )));
        }
        Ok(())
    }
}

/// Unique temp-file path next to the final destination.
///
/// The UUID avoids conflicts between concurrent writes to the same name.
fn temp_sibling(path: &Path) -> PathBuf {
    let temp_name = format!(".tmp.{}", Uuid::new_v4());
    path.with_file_name(
        path.file_name()
            .map(|n| format!("{}{}", n.to_string_lossy(), temp_name))
            .unwrap_or_else(|| temp_name.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    async fn test_tiers() -> (tempfile::TempDir, TierStore) {
        let temp = tempfile::tempdir().unwrap();
        let store = TierStore::new(temp.path().join("cache"), temp.path().join("storage"))
            .await
            .unwrap();
        (temp, store)
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let (_temp, store) = test_tiers().await;

        let data = Bytes::from("hello world");
        store.put(Tier::Cache, "a.txt", data.clone()).await.unwrap();

        assert!(store.exists(Tier::Cache, "a.txt").await.unwrap());
        assert!(!store.exists(Tier::Storage, "a.txt").await.unwrap());
        assert_eq!(store.get(Tier::Cache, "a.txt").await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_get_stream_returns_full_content() {
        let (_temp, store) = test_tiers().await;

        // Larger than one stream chunk so the loop runs more than once.
        let data = Bytes::from(vec![7u8; STREAM_CHUNK_SIZE * 2 + 17]);
        store.put(Tier::Cache, "big.bin", data.clone()).await.unwrap();

        let stream = store.get_stream(Tier::Cache, "big.bin").await.unwrap();
        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        assert!(chunks.len() >= 3);
        let joined: Vec<u8> = chunks.concat();
        assert_eq!(joined, data);
    }

    #[tokio::test]
    async fn test_unsafe_names_rejected() {
        let (_temp, store) = test_tiers().await;

        for name in ["", ".", "..", "a/b", "a\\b", "x\0y"] {
            let err = store.exists(Tier::Cache, name).await.unwrap_err();
            assert!(
                matches!(err, StorageError::InvalidName(_)),
                "expected InvalidName for {name:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_copy_across_then_delete_source() {
        let (_temp, store) = test_tiers().await;

        let data = Bytes::from("migrate me");
        store.put(Tier::Cache, "m.bin", data.clone()).await.unwrap();

        let copied = store
            .copy_across(Tier::Cache, Tier::Storage, "m.bin")
            .await
            .unwrap();
        assert_eq!(copied, data.len() as u64);
        assert_eq!(store.get(Tier::Storage, "m.bin").await.unwrap(), data);

        store.delete(Tier::Cache, "m.bin").await.unwrap();
        assert!(!store.exists(Tier::Cache, "m.bin").await.unwrap());
        assert_eq!(store.get(Tier::Storage, "m.bin").await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_copy_missing_source_is_not_found() {
        let (_temp, store) = test_tiers().await;

        let err = store
            .copy_across(Tier::Cache, Tier::Storage, "ghost.bin")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (_temp, store) = test_tiers().await;

        let err = store.delete(Tier::Cache, "ghost.bin").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_head_reports_size() {
        let (_temp, store) = test_tiers().await;

        store
            .put(Tier::Cache, "sized.bin", Bytes::from(vec![0u8; 1234]))
            .await
            .unwrap();
        let meta = store.head(Tier::Cache, "sized.bin").await.unwrap();
        assert_eq!(meta.size, 1234);
        assert!(meta.modified.is_some());

        let err = store.head(Tier::Cache, "ghost.bin").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let (temp, store) = test_tiers().await;

        store
            .put(Tier::Cache, "a.txt", Bytes::from("x"))
            .await
            .unwrap();
        store
            .copy_across(Tier::Cache, Tier::Storage, "a.txt")
            .await
            .unwrap();

        for dir in ["cache", "storage"] {
            let mut entries = std::fs::read_dir(temp.path().join(dir))
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
                .collect::<Vec<_>>();
            entries.retain(|n| n.contains(".tmp."));
            assert!(entries.is_empty(), "leftover temp files: {entries:?}");
        }
    }
}
