//! Background worker for continuous Janitor operation

use crate::report::ScanReport;
use crate::{Janitor, JanitorError, JanitorMetrics};
use janitor_domain::{Scope, StateStore};
use std::future::Future;
use std::io;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Background worker that runs the Janitor on a schedule
///
/// Each tick scans the worker's fixed list of scopes. A scan that overruns
/// the interval delays the next tick instead of triggering a burst.
///
/// # Examples
///
/// ```no_run
/// use janitor_core::{Janitor, JanitorConfig, JanitorWorker};
/// use janitor_store::MemoryStateStore;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run(types: Vec<Arc<dyn janitor_domain::ResourceType>>) -> Result<(), janitor_core::JanitorError> {
/// let janitor = Janitor::new(JanitorConfig::default(), types, Arc::new(MemoryStateStore::new()));
/// let scopes = vec![janitor.scope("111111111111", "us-east-1")];
/// let mut worker = JanitorWorker::new(janitor, scopes)?;
///
/// // Run until Ctrl+C or the token is cancelled
/// worker.run(CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
pub struct JanitorWorker<S: StateStore> {
    janitor: Janitor<S>,
    scopes: Vec<Scope>,
    interval: Duration,
}

impl<S: StateStore> JanitorWorker<S> {
    /// Create a new background worker scanning `scopes`
    pub fn new(janitor: Janitor<S>, scopes: Vec<Scope>) -> Result<Self, JanitorError> {
        let interval = janitor.config().sweep_interval();
        if interval.is_zero() {
            return Err(JanitorError::Config("sweep interval must be positive".into()));
        }
        Ok(Self {
            janitor,
            scopes,
            interval,
        })
    }

    /// Run the worker until a shutdown signal (Ctrl+C) or cancellation
    ///
    /// Failed scans are logged and the worker keeps going; the next scan
    /// retries whatever failed.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), JanitorError> {
        self.run_until(cancel, tokio::signal::ctrl_c()).await
    }

    /// Run the worker until `shutdown` resolves or `cancel` is cancelled
    ///
    /// `shutdown` is watched by its own task for the worker's whole life, so
    /// a signal that arrives mid-scan cancels that scan's in-flight calls.
    /// The interrupted scan still saves its partial ledger.
    pub async fn run_until<F>(
        &mut self,
        cancel: CancellationToken,
        shutdown: F,
    ) -> Result<(), JanitorError>
    where
        F: Future<Output = io::Result<()>> + Send + 'static,
    {
        let trigger = cancel.clone();
        let listener = tokio::spawn(async move {
            match shutdown.await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received, stopping janitor");
                    trigger.cancel();
                }
                Err(e) => tracing::warn!(error = %e, "Cannot listen for shutdown signal"),
            }
        });

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            scopes = self.scopes.len(),
            "Janitor worker started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::debug!("Starting scan cycle");
                    let report = self.janitor.scan(&self.scopes, &cancel).await;
                    if report.is_success() {
                        tracing::info!(deleted = report.total_deleted(), "Scan completed");
                    } else {
                        tracing::error!(
                            deleted = report.total_deleted(),
                            errors = report.error_count(),
                            "Scan completed with errors"
                        );
                    }
                    if cancel.is_cancelled() {
                        break;
                    }
                }
                _ = cancel.cancelled() => {
                    tracing::info!("Cancelled, stopping janitor");
                    break;
                }
            }
        }

        listener.abort();
        tracing::info!("Janitor stopped. Final metrics:\n{}", self.janitor.metrics().summary());
        Ok(())
    }

    /// Run for a specific number of cycles
    ///
    /// Stops at the first scan that reports errors and returns the last
    /// report otherwise.
    pub async fn run_cycles(
        &mut self,
        cycles: usize,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, JanitorError> {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = ScanReport::default();

        tracing::info!(cycles, interval_secs = self.interval.as_secs(), "Janitor worker started");

        for cycle in 0..cycles {
            ticker.tick().await;

            tracing::debug!("Starting scan cycle {}/{}", cycle + 1, cycles);
            last = self.janitor.scan(&self.scopes, cancel).await;

            if let Some(first) = last.errors().next() {
                tracing::error!("Scan {}/{} failed: {}", cycle + 1, cycles, first);
                return Err(JanitorError::Worker(format!(
                    "scan {}/{} reported {} errors, first: {}",
                    cycle + 1,
                    cycles,
                    last.error_count(),
                    first
                )));
            }
        }

        tracing::info!("Janitor finished {} cycles. Final metrics:\n{}", cycles, self.janitor.metrics().summary());
        Ok(last)
    }

    /// Get a reference to the janitor's current metrics
    pub fn metrics(&self) -> &JanitorMetrics {
        self.janitor.metrics()
    }

    /// Reset the janitor's metrics counters
    pub fn reset_metrics(&mut self) {
        self.janitor.reset_metrics();
    }
}
