//! Ingest pipeline behavior: validation, dedup, collisions, backpressure.

mod common;

use bytes::Bytes;
use common::build_depot;
use depot_core::{DEFAULT_FILENAME, Tier};
use depot_engine::EngineError;
use depot_metadata::FileRepo;
use futures::TryStreamExt;

const MAX_UPLOAD: u64 = 1024 * 1024;
const BUDGET: u64 = 1024 * 1024;

async fn download_bytes(depot: &depot_engine::Depot, name: &str) -> Vec<u8> {
    let (_, stream) = depot.open_download(name).await.unwrap();
    let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
    chunks.concat()
}

#[tokio::test]
async fn test_upload_download_roundtrip() {
    let t = build_depot(MAX_UPLOAD, BUDGET).await;

    let row = t
        .depot
        .store_file("report.pdf", Bytes::from("content A"))
        .await
        .unwrap();
    assert_eq!(row.filename, "report.pdf");
    assert_eq!(row.current_tier().unwrap(), Tier::Cache);

    assert_eq!(download_bytes(&t.depot, "report.pdf").await, b"content A");
}

#[tokio::test]
async fn test_oversized_payload_rejected_without_side_effects() {
    let t = build_depot(16, BUDGET).await;

    let err = t
        .depot
        .store_file("big.bin", Bytes::from(vec![0u8; 17]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::PayloadTooLarge { size: 17, max: 16 }));

    assert!(t.depot.list_files().await.unwrap().is_empty());
    assert!(!t.depot.tiers().exists(Tier::Cache, "big.bin").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_content_rejected() {
    let t = build_depot(MAX_UPLOAD, BUDGET).await;

    t.depot
        .store_file("one.txt", Bytes::from("same bytes"))
        .await
        .unwrap();
    let err = t
        .depot
        .store_file("two.txt", Bytes::from("same bytes"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, EngineError::DuplicateContent { ref existing } if existing == "one.txt"),
        "got {err:?}"
    );

    // No second row, no second physical copy.
    assert_eq!(t.depot.list_files().await.unwrap().len(), 1);
    assert!(!t.depot.tiers().exists(Tier::Cache, "two.txt").await.unwrap());
}

#[tokio::test]
async fn test_name_collision_gets_smallest_free_suffix() {
    let t = build_depot(MAX_UPLOAD, BUDGET).await;

    let a = t
        .depot
        .store_file("report.pdf", Bytes::from("content A"))
        .await
        .unwrap();
    let b = t
        .depot
        .store_file("report.pdf", Bytes::from("content B"))
        .await
        .unwrap();
    let c = t
        .depot
        .store_file("report.pdf", Bytes::from("content C"))
        .await
        .unwrap();

    assert_eq!(a.filename, "report.pdf");
    assert_eq!(b.filename, "report.pdf_(1)");
    assert_eq!(c.filename, "report.pdf_(2)");

    let listed: Vec<String> = t
        .depot
        .list_files()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert!(listed.contains(&"report.pdf".to_string()));
    assert!(listed.contains(&"report.pdf_(1)".to_string()));

    assert_eq!(download_bytes(&t.depot, "report.pdf").await, b"content A");
    assert_eq!(download_bytes(&t.depot, "report.pdf_(1)").await, b"content B");
}

#[tokio::test]
async fn test_traversal_names_are_flattened() {
    let t = build_depot(MAX_UPLOAD, BUDGET).await;

    let row = t
        .depot
        .store_file("../../etc/passwd", Bytes::from("not a password file"))
        .await
        .unwrap();
    assert_eq!(row.filename, "passwd");

    // The bytes landed inside the cache root under the flattened name.
    assert!(t.depot.tiers().exists(Tier::Cache, "passwd").await.unwrap());

    // Retrieval applies the same sanitization and finds the same record.
    assert_eq!(
        download_bytes(&t.depot, "../../etc/passwd").await,
        b"not a password file"
    );
}

#[tokio::test]
async fn test_parent_token_rejected() {
    let t = build_depot(MAX_UPLOAD, BUDGET).await;

    let err = t
        .depot
        .store_file("..", Bytes::from("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
}

#[tokio::test]
async fn test_empty_name_falls_back_to_default() {
    let t = build_depot(MAX_UPLOAD, BUDGET).await;

    let row = t.depot.store_file("", Bytes::from("x")).await.unwrap();
    assert_eq!(row.filename, DEFAULT_FILENAME);
}

#[tokio::test]
async fn test_over_budget_enqueue_rejected_file_stays_in_cache() {
    // Budget below the payload size: admission is refused, non-blocking.
    let t = build_depot(MAX_UPLOAD, 4).await;

    let row = t
        .depot
        .store_file("resident.bin", Bytes::from("stays in cache"))
        .await
        .unwrap();

    assert_eq!(t.depot.queue().queued_bytes(), 0);
    assert_eq!(row.current_tier().unwrap(), Tier::Cache);
    assert_eq!(
        download_bytes(&t.depot, "resident.bin").await,
        b"stays in cache"
    );
}

#[tokio::test]
async fn test_delete_removes_bytes_and_row() {
    let t = build_depot(MAX_UPLOAD, BUDGET).await;

    t.depot
        .store_file("gone.txt", Bytes::from("bye"))
        .await
        .unwrap();
    let name = t.depot.delete_file("gone.txt").await.unwrap();
    assert_eq!(name, "gone.txt");

    assert!(!t.depot.tiers().exists(Tier::Cache, "gone.txt").await.unwrap());
    assert!(
        t.depot
            .metadata()
            .get_file_by_name("gone.txt")
            .await
            .unwrap()
            .is_none()
    );

    // Repeated delete is a clean not-found.
    let err = t.depot.delete_file("gone.txt").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn test_info_reports_size() {
    let t = build_depot(MAX_UPLOAD, BUDGET).await;

    t.depot
        .store_file("info.txt", Bytes::from("12345"))
        .await
        .unwrap();
    let entry = t.depot.file_info("info.txt").await.unwrap();
    assert_eq!(entry.name, "info.txt");
    assert_eq!(entry.size, 5);
    assert!(entry.modified > 0);

    let err = t.depot.file_info("missing.txt").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let t = build_depot(MAX_UPLOAD, BUDGET).await;

    t.depot.store_file("a", Bytes::from("1")).await.unwrap();
    t.depot.store_file("b", Bytes::from("2")).await.unwrap();

    let names: Vec<String> = t
        .depot
        .list_files()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names.len(), 2);
    // Same-second uploads tie on created_at; id order breaks the tie.
    assert_eq!(names[0], "b");
    assert_eq!(names[1], "a");
}
