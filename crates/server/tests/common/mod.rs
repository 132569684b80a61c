//! Server test utilities.

use depot_core::config::AppConfig;
use depot_engine::{Depot, MigrationQueue};
use depot_metadata::{MetadataStore, SqliteStore};
use depot_server::{AppState, create_router};
use depot_storage::TierStore;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub worker: JoinHandle<()>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage and a running
    /// migration worker.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server after applying `adjust` to the default config.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp directory");

        let mut config = AppConfig::for_testing(temp_dir.path());
        adjust(&mut config);

        let tiers = Arc::new(
            TierStore::new(&config.storage.cache_root, &config.storage.storage_root)
                .await
                .expect("failed to create tier store"),
        );
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(&config.metadata.db_path)
                .await
                .expect("failed to create metadata store"),
        );

        let queue = MigrationQueue::new(
            Arc::clone(&tiers),
            Arc::clone(&metadata),
            config.migration.max_queued_bytes,
        );
        let worker = queue.spawn_worker();

        let depot = Arc::new(Depot::new(
            metadata,
            tiers,
            queue,
            config.server.max_upload_bytes,
        ));
        let state = AppState::new(config, depot);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            worker,
            _temp_dir: temp_dir,
        }
    }
}
