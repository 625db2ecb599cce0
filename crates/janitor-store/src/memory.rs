//! In-process state store

use crate::error::StoreError;
use async_trait::async_trait;
use janitor_domain::StateStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// State store backed by a `HashMap`
///
/// Used for tests and single-shot runs that should not persist anything.
/// Loads and saves can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stored bytes for `scope_key`
    pub fn get(&self, scope_key: &str) -> Option<Vec<u8>> {
        self.entries().get(scope_key).cloned()
    }

    /// Put bytes directly, bypassing the save counter
    pub fn insert(&self, scope_key: impl Into<String>, bytes: Vec<u8>) {
        self.entries().insert(scope_key.into(), bytes);
    }

    /// Make every subsequent `load` fail
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `save` fail
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    type Error = StoreError;

    async fn load(&self, scope_key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("load of {} refused", scope_key)));
        }
        Ok(self.get(scope_key))
    }

    async fn save(&self, scope_key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("save of {} refused", scope_key)));
        }
        self.entries().insert(scope_key.to_string(), bytes);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
