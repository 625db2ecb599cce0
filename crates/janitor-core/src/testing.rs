//! Fake resource type for orchestrator tests

use async_trait::async_trait;
use janitor_domain::{
    sweep, Candidate, DeleteOutcome, ResourceError, ResourceIdentity, ResourceKey, ResourceType,
    Scope, Set, SweepReport, SystemClock,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory resource type whose live resources are plain names
pub struct FakeType {
    name: &'static str,
    live: Mutex<BTreeSet<String>>,
    deleted: Mutex<Vec<String>>,
    fail: AtomicBool,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl FakeType {
    pub fn new(name: &'static str, live: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name,
            live: Mutex::new(live.iter().map(|s| s.to_string()).collect()),
            deleted: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            delay: Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn add(&self, resource: &str) {
        self.live.lock().unwrap().insert(resource.to_string());
    }

    pub fn remove(&self, resource: &str) {
        self.live.lock().unwrap().remove(resource);
    }

    pub fn live(&self) -> Vec<String> {
        self.live.lock().unwrap().iter().cloned().collect()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enumerate(&self) -> Result<Vec<String>, ResourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ResourceError::Other(format!("{} unavailable", self.name)));
        }
        Ok(self.live())
    }
}

#[async_trait]
impl ResourceType for FakeType {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn list_all(&self, _scope: &Scope) -> Result<Set, ResourceError> {
        let live = self.enumerate().await?;
        Ok(Set::inventory(
            live.into_iter().map(ResourceKey::new),
            Arc::new(SystemClock),
        ))
    }

    async fn mark_and_sweep(&self, scope: &Scope, set: &Set) -> Result<SweepReport, ResourceError> {
        let candidates = self
            .enumerate()
            .await?
            .into_iter()
            .map(|name| Candidate::new(ResourceIdentity::new(name.clone()), name))
            .collect();

        let this = self;
        Ok(sweep(self.name, scope, set, candidates, move |name: String| async move {
            this.live.lock().unwrap().remove(&name);
            this.deleted.lock().unwrap().push(name);
            Ok::<_, ResourceError>(DeleteOutcome::Deleted)
        })
        .await)
    }
}

/// Upcast for `Janitor::new`
pub fn types(fakes: &[&Arc<FakeType>]) -> Vec<Arc<dyn ResourceType>> {
    fakes
        .iter()
        .map(|fake| Arc::clone(fake) as Arc<dyn ResourceType>)
        .collect()
}
