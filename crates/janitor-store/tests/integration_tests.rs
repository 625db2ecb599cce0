//! Integration tests for janitor-store
//!
//! These tests drive the full load/mark/save cycle against the local
//! filesystem store.

use chrono::{Duration, TimeZone, Utc};
use janitor_domain::{ManualClock, ResourceIdentity, ResourceKey, StateStore};
use janitor_store::{ledger, FileStateStore};
use std::sync::Arc;
use tempfile::TempDir;

const SCOPE: &str = "111111111111/us-east-1";

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    ))
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = FileStateStore::new(dir.path());
    assert!(store.load(SCOPE).await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_creates_scope_directories() {
    let dir = TempDir::new().unwrap();
    let store = FileStateStore::new(dir.path());
    store.save(SCOPE, b"{}\n".to_vec()).await.unwrap();

    let expected = dir.path().join("111111111111").join("us-east-1.json");
    assert!(expected.exists());
    assert_eq!(std::fs::read(&expected).unwrap(), b"{}\n");
    // No leftover temp file
    assert!(!dir.path().join("111111111111").join("us-east-1.json.tmp").exists());
}

#[tokio::test]
async fn test_ages_survive_process_restart() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let queue = ResourceIdentity::new("arn:aws:sqs:us-east-1:111111111111:jobs");

    {
        let store = FileStateStore::new(dir.path());
        let set = ledger::load_set(&store, SCOPE, Duration::hours(24), clock.clone())
            .await
            .unwrap();
        assert!(!set.mark(&queue, None));
        set.mark_complete();
        ledger::save_set(&store, SCOPE, &set).await.unwrap();
    }

    clock.advance(Duration::hours(25));

    let store = FileStateStore::new(dir.path());
    let set = ledger::load_set(&store, SCOPE, Duration::hours(24), clock.clone())
        .await
        .unwrap();
    assert_eq!(
        set.first_seen(&ResourceKey::new("arn:aws:sqs:us-east-1:111111111111:jobs")),
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    );
    assert!(set.mark(&queue, None));
}

#[tokio::test]
async fn test_pruned_keys_are_not_reloaded() {
    let dir = TempDir::new().unwrap();
    let store = FileStateStore::new(dir.path());
    let clock = clock();

    let set = ledger::load_set(&store, SCOPE, Duration::hours(1), clock.clone())
        .await
        .unwrap();
    set.mark(&ResourceIdentity::new("keep"), None);
    set.mark(&ResourceIdentity::new("gone"), None);
    set.mark_complete();
    ledger::save_set(&store, SCOPE, &set).await.unwrap();

    set.mark(&ResourceIdentity::new("keep"), None);
    assert_eq!(set.mark_complete(), 1);
    ledger::save_set(&store, SCOPE, &set).await.unwrap();

    let reloaded = ledger::load_set(&store, SCOPE, Duration::hours(1), clock)
        .await
        .unwrap();
    assert_eq!(reloaded.keys(), vec![ResourceKey::new("keep")]);
}

#[tokio::test]
async fn test_scopes_are_isolated() {
    let dir = TempDir::new().unwrap();
    let store = FileStateStore::new(dir.path());
    let clock = clock();

    let east = ledger::load_set(&store, "1/us-east-1", Duration::hours(1), clock.clone())
        .await
        .unwrap();
    east.mark(&ResourceIdentity::new("east-only"), None);
    ledger::save_set(&store, "1/us-east-1", &east).await.unwrap();

    let west = ledger::load_set(&store, "1/us-west-2", Duration::hours(1), clock)
        .await
        .unwrap();
    assert!(west.is_empty());
}

#[tokio::test]
async fn test_corrupt_file_fails_load() {
    let dir = TempDir::new().unwrap();
    let store = FileStateStore::new(dir.path());
    store.save(SCOPE, b"{ truncated".to_vec()).await.unwrap();

    let result = ledger::load_set(&store, SCOPE, Duration::hours(1), clock()).await;
    assert!(result.is_err());
}
