//! Load/save lifecycle for per-scope ledgers

use crate::codec;
use crate::error::StoreError;
use chrono::Duration;
use janitor_domain::{Clock, Set, StateStore};
use std::sync::Arc;
use tracing::{debug, info};

/// Load the ledger for `scope_key`
///
/// A scope that was never saved yields an empty Set. Any other failure is
/// returned: scanning with a ledger that failed to load would restart every
/// resource's grace period.
pub async fn load_set<S>(
    store: &S,
    scope_key: &str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
) -> Result<Set, StoreError>
where
    S: StateStore + ?Sized,
{
    let bytes = store
        .load(scope_key)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

    match bytes {
        None => {
            info!(scope = scope_key, "No saved state, starting empty");
            Ok(Set::with_clock(ttl, clock))
        }
        Some(bytes) => {
            let snapshot = codec::decode(&bytes)?;
            debug!(scope = scope_key, tracked = snapshot.len(), "Loaded state");
            Ok(Set::from_snapshot(ttl, snapshot, clock))
        }
    }
}

/// Persist `set` under `scope_key`
///
/// The dirty flag is cleared when the snapshot is taken and restored if the
/// write fails. A `mark` that lands while the write is in flight leaves the
/// Set dirty.
pub async fn save_set<S>(store: &S, scope_key: &str, set: &Set) -> Result<(), StoreError>
where
    S: StateStore + ?Sized,
{
    let snapshot = set.checkpoint();
    let saved = match codec::encode(&snapshot) {
        Ok(bytes) => store
            .save(scope_key, bytes)
            .await
            .map_err(|e| StoreError::Backend(e.to_string())),
        Err(e) => Err(e),
    };
    if saved.is_err() {
        set.mark_dirty();
    }
    saved?;
    debug!(scope = scope_key, tracked = snapshot.len(), "Saved state");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStateStore;
    use chrono::{TimeZone, Utc};
    use janitor_domain::{ManualClock, ResourceIdentity};

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()))
    }

    #[tokio::test]
    async fn test_missing_state_is_empty_set() {
        let store = MemoryStateStore::new();
        let set = load_set(&store, "1/us-east-1", Duration::hours(1), clock())
            .await
            .unwrap();
        assert!(set.is_empty());
        assert!(!set.is_dirty());
    }

    #[tokio::test]
    async fn test_load_failure_is_an_error() {
        let store = MemoryStateStore::new();
        store.fail_loads(true);
        let result = load_set(&store, "1/us-east-1", Duration::hours(1), clock()).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn test_corrupt_state_is_an_error() {
        let store = MemoryStateStore::new();
        store.insert("1/us-east-1", b"[1, 2".to_vec());
        let result = load_set(&store, "1/us-east-1", Duration::hours(1), clock()).await;
        assert!(matches!(result, Err(StoreError::Codec(_))));
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_ages() {
        let store = MemoryStateStore::new();
        let clock = clock();
        let set = Set::with_clock(Duration::hours(1), clock.clone());
        set.mark(&ResourceIdentity::new("k"), None);
        assert!(set.is_dirty());

        save_set(&store, "1/us-east-1", &set).await.unwrap();
        assert!(!set.is_dirty());

        clock.advance(Duration::hours(2));
        let restored = load_set(&store, "1/us-east-1", Duration::hours(1), clock.clone())
            .await
            .unwrap();
        assert!(restored.mark(&ResourceIdentity::new("k"), None));
    }

    /// Store that records a new resource in the Set while the write is in flight
    struct MarksDuringSave {
        inner: MemoryStateStore,
        set: Arc<Set>,
    }

    #[async_trait::async_trait]
    impl StateStore for MarksDuringSave {
        type Error = StoreError;

        async fn load(&self, scope_key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.inner.load(scope_key).await
        }

        async fn save(&self, scope_key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
            self.set.mark(&ResourceIdentity::new("late"), None);
            self.inner.save(scope_key, bytes).await
        }
    }

    #[tokio::test]
    async fn test_mark_during_save_stays_dirty() {
        let set = Arc::new(Set::with_clock(Duration::hours(1), clock()));
        set.mark(&ResourceIdentity::new("early"), None);
        let store = MarksDuringSave {
            inner: MemoryStateStore::new(),
            set: set.clone(),
        };

        save_set(&store, "s", &set).await.unwrap();

        assert!(set.is_dirty());
        let saved = crate::codec::decode(&store.inner.get("s").unwrap()).unwrap();
        assert_eq!(saved.len(), 1);

        save_set(&store.inner, "s", &set).await.unwrap();
        assert!(!set.is_dirty());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_set_dirty() {
        let store = MemoryStateStore::new();
        store.fail_saves(true);
        let set = Set::with_clock(Duration::hours(1), clock());
        set.mark(&ResourceIdentity::new("k"), None);
        assert!(save_set(&store, "s", &set).await.is_err());
        assert!(set.is_dirty());
    }
}
