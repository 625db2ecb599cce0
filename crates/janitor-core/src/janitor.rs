//! Core Janitor implementation: the scan orchestrator

use crate::report::{ScanReport, ScopeReport};
use crate::{JanitorConfig, JanitorError, JanitorMetrics};
use futures::stream::{self, StreamExt};
use janitor_domain::{Clock, ResourceError, ResourceKey, ResourceType, Scope, StateStore, SystemClock};
use janitor_store::ledger;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Scan orchestrator
///
/// Drives every registered resource type over a set of account/region
/// scopes. Each scope owns its own ledger: it is loaded before the first
/// adapter runs and saved after the last one, so scopes can be scanned
/// concurrently without sharing state.
///
/// Two processes must not scan the same scope with the same store at the
/// same time; the last save would win.
///
/// # Examples
///
/// ```no_run
/// use janitor_core::{Janitor, JanitorConfig};
/// use janitor_store::MemoryStateStore;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run(types: Vec<Arc<dyn janitor_domain::ResourceType>>) {
/// let mut janitor = Janitor::new(JanitorConfig::default(), types, Arc::new(MemoryStateStore::new()));
/// let scope = janitor.scope("111111111111", "us-east-1");
/// let report = janitor.scan(&[scope], &CancellationToken::new()).await;
/// println!("{}", report.summary());
/// # }
/// ```
pub struct Janitor<S: StateStore> {
    config: JanitorConfig,
    types: Vec<Arc<dyn ResourceType>>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    metrics: JanitorMetrics,
}

impl<S: StateStore> Janitor<S> {
    /// Create a Janitor over `types`, keeping only those the config enables
    pub fn new(config: JanitorConfig, types: Vec<Arc<dyn ResourceType>>, store: Arc<S>) -> Self {
        let types = types
            .into_iter()
            .filter(|t| config.is_type_enabled(t.name()))
            .collect();
        Self {
            config,
            types,
            store,
            clock: Arc::new(SystemClock),
            metrics: JanitorMetrics::new(),
        }
    }

    /// Replace the clock used for ledger timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }

    /// Names of the resource types that will run, in order
    pub fn type_names(&self) -> Vec<&'static str> {
        self.types.iter().map(|t| t.name()).collect()
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &JanitorMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Scope for `account`/`region` carrying this janitor's TTL, dry-run
    /// flag and tag filter
    pub fn scope(&self, account: impl Into<String>, region: impl Into<String>) -> Scope {
        Scope::new(account, region, self.config.ttl())
            .with_dry_run(self.config.dry_run)
            .with_tags(self.config.tag_filter())
    }

    /// Mark and sweep every scope
    ///
    /// Scopes run concurrently, at most `max_concurrent_scopes` at a time.
    /// Errors are collected in the report and never stop other scopes or
    /// adapters.
    pub async fn scan(&mut self, scopes: &[Scope], cancel: &CancellationToken) -> ScanReport {
        let start = Instant::now();
        info!(scopes = scopes.len(), types = ?self.type_names(), "Starting scan");

        let report = {
            let this = &*self;
            this.for_each_scope(scopes, |scope| this.scan_scope(scope, cancel)).await
        };

        self.metrics.record_scan(&report, start.elapsed());
        info!(
            deleted = report.total_deleted(),
            pruned = report.total_pruned(),
            errors = report.error_count(),
            "Scan finished"
        );
        report
    }

    /// Mark and sweep one scope against its persisted ledger
    ///
    /// If the ledger cannot be loaded no adapter runs. Keys are pruned only
    /// when every adapter completed its pass; otherwise keys owned by the
    /// failed adapter would lose their age. The ledger is saved whenever it
    /// changed, including after cancellation.
    pub async fn scan_scope(&self, scope: &Scope, cancel: &CancellationToken) -> ScopeReport {
        let key = scope.key();
        let mut report = ScopeReport::new(&key, scope.dry_run);

        if cancel.is_cancelled() {
            debug!(scope = %scope, "Cancelled before start");
            report.cancelled = true;
            report.errors.push(JanitorError::Cancelled { scope: key });
            return report;
        }

        let set = match ledger::load_set(&*self.store, &key, scope.ttl, self.clock.clone()).await {
            Ok(set) => set,
            Err(source) => {
                error!(scope = %scope, error = %source, "Failed to load state, skipping scope");
                report.errors.push(JanitorError::StateLoad { scope: key, source });
                return report;
            }
        };

        let mut complete = true;
        for adapter in &self.types {
            let pass = self.run_pass(scope, adapter.as_ref(), cancel, adapter.mark_and_sweep(scope, &set));
            match pass.await {
                Ok(sweep) => report.sweeps.push(sweep),
                Err(e) => {
                    complete = false;
                    if e.is_cancelled() {
                        warn!(scope = %scope, resource_type = adapter.name(), "Scan cancelled");
                        report.cancelled = true;
                        report.errors.push(e);
                        break;
                    }
                    error!(scope = %scope, resource_type = adapter.name(), error = %e, "Resource pass failed");
                    report.errors.push(e);
                }
            }
        }

        if complete {
            report.pruned = set.mark_complete();
            if report.pruned > 0 {
                info!(scope = %scope, pruned = report.pruned, "Pruned resources no longer present");
            }
        } else {
            set.reset_pass();
        }
        report.tracked = set.len();

        if set.is_dirty() || report.pruned > 0 {
            match ledger::save_set(&*self.store, &key, &set).await {
                Ok(()) => report.persisted = true,
                Err(source) => {
                    error!(scope = %scope, error = %source, "Failed to save state");
                    report.errors.push(JanitorError::StateSave { scope: key, source });
                }
            }
        }

        report
    }

    /// Delete every live resource now, regardless of age
    ///
    /// Each adapter first lists its resources into a zero-TTL ledger and then
    /// sweeps against it, so everything it finds is eligible. Persisted state
    /// is neither read nor written.
    pub async fn purge(&mut self, scopes: &[Scope], cancel: &CancellationToken) -> ScanReport {
        let start = Instant::now();
        warn!(scopes = scopes.len(), types = ?self.type_names(), "Starting purge of all resources");

        let report = {
            let this = &*self;
            this.for_each_scope(scopes, |scope| this.purge_scope(scope, cancel)).await
        };

        self.metrics.record_scan(&report, start.elapsed());
        info!(deleted = report.total_deleted(), errors = report.error_count(), "Purge finished");
        report
    }

    async fn purge_scope(&self, scope: &Scope, cancel: &CancellationToken) -> ScopeReport {
        let key = scope.key();
        let mut report = ScopeReport::new(&key, scope.dry_run);

        for adapter in &self.types {
            let listed = self
                .run_pass(scope, adapter.as_ref(), cancel, adapter.list_all(scope))
                .await;
            let result = match listed {
                Ok(seed) => {
                    self.run_pass(scope, adapter.as_ref(), cancel, adapter.mark_and_sweep(scope, &seed))
                        .await
                }
                Err(e) => Err(e),
            };
            match result {
                Ok(sweep) => report.sweeps.push(sweep),
                Err(e) if e.is_cancelled() => {
                    report.cancelled = true;
                    report.errors.push(e);
                    break;
                }
                Err(e) => {
                    error!(scope = %scope, resource_type = adapter.name(), error = %e, "Purge pass failed");
                    report.errors.push(e);
                }
            }
        }
        report
    }

    /// List every live resource in `scope` without deleting anything
    pub async fn inventory(&self, scope: &Scope) -> Result<Vec<(&'static str, ResourceKey)>, JanitorError> {
        let cancel = CancellationToken::new();
        let mut found = Vec::new();
        for adapter in &self.types {
            let set = self
                .run_pass(scope, adapter.as_ref(), &cancel, adapter.list_all(scope))
                .await?;
            found.extend(set.keys().into_iter().map(|key| (adapter.name(), key)));
        }
        Ok(found)
    }

    async fn for_each_scope<'a, F, Fut>(&'a self, scopes: &'a [Scope], run: F) -> ScanReport
    where
        F: Fn(&'a Scope) -> Fut,
        Fut: Future<Output = ScopeReport> + 'a,
    {
        let limit = self.config.max_concurrent_scopes.max(1);
        let scopes = stream::iter(scopes).map(run).buffered(limit).collect().await;
        ScanReport { scopes }
    }

    /// Run one adapter call under the per-call timeout, racing cancellation
    async fn run_pass<T, Fut>(
        &self,
        scope: &Scope,
        adapter: &dyn ResourceType,
        cancel: &CancellationToken,
        call: Fut,
    ) -> Result<T, JanitorError>
    where
        Fut: Future<Output = Result<T, ResourceError>>,
    {
        let timeout = self.config.adapter_timeout();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(JanitorError::Cancelled { scope: scope.key() }),
            result = tokio::time::timeout(timeout, call) => match result {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(source)) => Err(JanitorError::Resource {
                    scope: scope.key(),
                    resource_type: adapter.name(),
                    source,
                }),
                Err(_) => Err(JanitorError::Timeout {
                    scope: scope.key(),
                    resource_type: adapter.name(),
                    timeout_secs: timeout.as_secs(),
                }),
            },
        }
    }
}

impl<S: StateStore> std::fmt::Debug for Janitor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Janitor")
            .field("config", &self.config)
            .field("types", &self.type_names())
            .finish_non_exhaustive()
    }
}
