//! AWS Janitor core
//!
//! Scan orchestration for the mark-and-sweep janitor: drives every resource
//! type over a list of account/region scopes, keeping one persisted ledger
//! per scope.
//!
//! # Overview
//!
//! A scan of one scope:
//! - **Loads** the scope's ledger; if that fails nothing is touched
//! - **Marks and sweeps** with every enabled resource type in turn, each
//!   call bounded by a timeout and interruptible by cancellation
//! - **Prunes** keys not seen this pass, but only when every type completed
//! - **Saves** the ledger back whenever it changed
//!
//! Errors are collected in a [`ScanReport`]; a failing scope or resource type
//! never stops the others.
//!
//! # Usage
//!
//! ## One-time Scan
//!
//! ```no_run
//! use janitor_core::{Janitor, JanitorConfig};
//! use janitor_store::FileStateStore;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run(types: Vec<Arc<dyn janitor_domain::ResourceType>>) {
//! let store = Arc::new(FileStateStore::new("/var/lib/aws-janitor"));
//! let mut janitor = Janitor::new(JanitorConfig::default(), types, store);
//!
//! let scopes = vec![
//!     janitor.scope("111111111111", "us-east-1"),
//!     janitor.scope("111111111111", "eu-west-1"),
//! ];
//! let report = janitor.scan(&scopes, &CancellationToken::new()).await;
//! println!("{}", report.summary());
//! # }
//! ```
//!
//! ## Background Worker
//!
//! See [`JanitorWorker`], which repeats the scan every
//! `sweep_interval_minutes` until Ctrl+C.
//!
//! # Configuration
//!
//! The Janitor can be configured via TOML:
//!
//! ```toml
//! ttl_hours = 24
//! dry_run = false
//! adapter_timeout_secs = 300
//! max_concurrent_scopes = 4
//! sweep_interval_minutes = 60
//! disabled_types = ["eventbridge-rules"]
//! exclude_tags = ["keep=true"]
//! ```
//!
//! # Metrics
//!
//! ```no_run
//! # use janitor_core::{Janitor, JanitorConfig};
//! # use janitor_store::MemoryStateStore;
//! # use std::sync::Arc;
//! # use tokio_util::sync::CancellationToken;
//! # async fn run(mut janitor: Janitor<MemoryStateStore>, scopes: Vec<janitor_domain::Scope>) {
//! janitor.scan(&scopes, &CancellationToken::new()).await;
//!
//! let metrics = janitor.metrics();
//! println!("Deleted: {}", metrics.total_deleted());
//! println!("Scans: {}", metrics.scan_count);
//! println!("\n{}", metrics.summary());
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod metrics;
mod janitor;
mod report;
mod worker;

#[cfg(test)]
mod testing;

pub use error::JanitorError;
pub use config::{JanitorConfig, MAX_TTL_HOURS};
pub use metrics::{JanitorMetrics, TypeCounters};
pub use janitor::Janitor;
pub use report::{ScanReport, ScopeReport};
pub use worker::JanitorWorker;
