use depot_engine::{Depot, MigrationQueue};
use depot_metadata::{FileRepo, MetadataStore, SqliteStore};
use depot_storage::TierStore;
use std::sync::Arc;
use std::time::Duration;

/// An engine wired to temp directories, dropped with them.
pub struct TestDepot {
    pub depot: Depot,
    // Held for the lifetime of the test.
    #[allow(dead_code)]
    pub temp: tempfile::TempDir,
}

/// Build an engine over fresh temp roots. No worker is spawned; tests that
/// exercise migration spawn it via `depot.queue().spawn_worker()`.
pub async fn build_depot(max_upload_bytes: u64, migration_budget: u64) -> TestDepot {
    let temp = tempfile::tempdir().unwrap();

    let metadata: Arc<dyn MetadataStore> = Arc::new(
        SqliteStore::new(temp.path().join("metadata.db"))
            .await
            .unwrap(),
    );
    let tiers = Arc::new(
        TierStore::new(temp.path().join("cache"), temp.path().join("storage"))
            .await
            .unwrap(),
    );
    let queue = MigrationQueue::new(Arc::clone(&tiers), Arc::clone(&metadata), migration_budget);

    TestDepot {
        depot: Depot::new(metadata, tiers, queue, max_upload_bytes),
        temp,
    }
}

/// Poll until the record for `name` reaches `tier`, panicking after 5s.
#[allow(dead_code)]
pub async fn wait_for_tier(depot: &Depot, name: &str, tier: depot_core::Tier) {
    for _ in 0..500 {
        let row = depot
            .metadata()
            .get_file_by_name(name)
            .await
            .unwrap()
            .expect("record vanished while waiting for tier flip");
        if row.current_tier().unwrap() == tier {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{name} never reached tier {tier}");
}
