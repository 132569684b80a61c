//! Cache-to-storage migration queue and its background worker.

use crate::error::EngineResult;
use depot_core::Tier;
use depot_metadata::{FileRepo, MetadataError, MetadataStore};
use depot_storage::TierStore;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// One pending migration. The size is captured at admission so byte
/// accounting never re-stats the file under the lock.
struct WorkItem {
    name: String,
    size: u64,
}

struct QueueState {
    items: VecDeque<WorkItem>,
    queued_bytes: u64,
    shutdown: bool,
}

/// Bounded, strictly-FIFO queue of files pending cache-to-storage
/// migration, drained by exactly one background worker.
///
/// Queue contents are transient: on process restart in-flight items are
/// lost, which is safe because the bytes remain in the cache tier and only
/// their promotion is delayed.
pub struct MigrationQueue {
    tiers: Arc<TierStore>,
    metadata: Arc<dyn MetadataStore>,
    // Held only for queue manipulation, never across file I/O.
    state: Mutex<QueueState>,
    notify: Notify,
    max_queued_bytes: u64,
    worker_spawned: AtomicBool,
}

impl MigrationQueue {
    /// Create a new queue with the given outstanding-byte budget.
    pub fn new(
        tiers: Arc<TierStore>,
        metadata: Arc<dyn MetadataStore>,
        max_queued_bytes: u64,
    ) -> Arc<Self> {
        Arc::new(Self {
            tiers,
            metadata,
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                queued_bytes: 0,
                shutdown: false,
            }),
            notify: Notify::new(),
            max_queued_bytes,
            worker_spawned: AtomicBool::new(false),
        })
    }

    /// Admit a cache-tier file into the queue.
    ///
    /// Returns `Ok(false)` without blocking when admission would exceed the
    /// outstanding-byte budget (or after shutdown); the file then simply
    /// stays resident in the cache tier. Errors when the name is not
    /// currently present in the cache tier.
    pub async fn enqueue(&self, name: &str) -> EngineResult<bool> {
        let meta = self.tiers.head(Tier::Cache, name).await?;
        let size = meta.size;

        let admitted = {
            let mut state = self.state.lock().expect("migration queue lock poisoned");
            if state.shutdown || state.queued_bytes.saturating_add(size) > self.max_queued_bytes {
                false
            } else {
                state.items.push_back(WorkItem {
                    name: name.to_string(),
                    size,
                });
                state.queued_bytes += size;
                true
            }
        };

        if admitted {
            self.notify.notify_one();
        }
        Ok(admitted)
    }

    /// Cumulative bytes currently admitted but not yet drained.
    pub fn queued_bytes(&self) -> u64 {
        self.state
            .lock()
            .expect("migration queue lock poisoned")
            .queued_bytes
    }

    /// Signal the worker to stop after the item it is currently draining.
    ///
    /// Undrained items are dropped; their bytes stay in the cache tier.
    pub fn shutdown(&self) {
        {
            let mut state = self.state.lock().expect("migration queue lock poisoned");
            state.shutdown = true;
        }
        self.notify.notify_one();
    }

    /// Spawn the single background worker.
    ///
    /// # Panics
    ///
    /// Panics when called a second time: the queue is single-consumer.
    pub fn spawn_worker(self: &Arc<Self>) -> JoinHandle<()> {
        assert!(
            !self.worker_spawned.swap(true, Ordering::SeqCst),
            "migration worker already spawned"
        );
        let queue = Arc::clone(self);
        tokio::spawn(async move { queue.run().await })
    }

    async fn run(self: Arc<Self>) {
        tracing::info!("migration worker started");
        loop {
            let item = {
                let mut state = self.state.lock().expect("migration queue lock poisoned");
                if state.shutdown {
                    tracing::info!(
                        pending = state.items.len(),
                        "migration worker stopping; undrained files stay in cache tier"
                    );
                    return;
                }
                match state.items.pop_front() {
                    Some(item) => {
                        state.queued_bytes -= item.size;
                        Some(item)
                    }
                    None => None,
                }
            };

            match item {
                Some(item) => self.migrate_one(&item).await,
                // Suspend until a producer enqueues or shutdown is signalled.
                None => self.notify.notified().await,
            }
        }
    }

    /// Move one file cache→storage: durable copy, then metadata flip, then
    /// cache-side delete. The tier column always names a tier that
    /// physically holds the file.
    async fn migrate_one(&self, item: &WorkItem) {
        let name = item.name.as_str();

        let copied = match self
            .tiers
            .copy_across(Tier::Cache, Tier::Storage, name)
            .await
        {
            Ok(copied) => copied,
            Err(e) => {
                // No retry: the file stays in the cache tier and the record
                // keeps claiming it there.
                tracing::warn!(name, error = %e, "migration copy failed; file stays in cache tier");
                return;
            }
        };

        match self.metadata.set_tier(name, Tier::Storage).await {
            Ok(()) => {}
            Err(e) => {
                // Record gone (concurrent delete, or ingest lost its name
                // race) or the update failed; either way the record does not
                // claim the bulk copy, so remove it again.
                if !matches!(e, MetadataError::NotFound(_)) {
                    tracing::error!(name, error = %e, "tier flip failed after copy");
                }
                if let Err(e) = self.tiers.delete(Tier::Storage, name).await {
                    tracing::warn!(name, error = %e, "failed to remove unclaimed bulk copy");
                } else {
                    tracing::debug!(name, "removed unclaimed bulk copy");
                }
                return;
            }
        }

        match self.tiers.delete(Tier::Cache, name).await {
            Ok(()) => {
                tracing::info!(name, bytes = copied, "file migrated to storage tier");
            }
            Err(e) => {
                // The record already points at the bulk copy; the stale
                // cache copy is unreferenced and only wastes space.
                tracing::warn!(name, error = %e, "cache copy left behind after migration");
            }
        }
    }
}
