//! Metrics collection for Janitor operations

use crate::report::ScanReport;
use std::collections::BTreeMap;
use std::time::Duration;

/// Counters for one resource type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeCounters {
    /// Resources seen live
    pub marked: usize,
    /// Resources deleted
    pub deleted: usize,
    /// Resources already gone at delete time
    pub already_gone: usize,
    /// Delete calls that failed
    pub failed: usize,
    /// Deletions suppressed by dry-run
    pub skipped: usize,
}

/// Metrics accumulated across scans
///
/// Tracks per-resource-type outcomes plus scan-level totals.
#[derive(Debug, Clone, Default)]
pub struct JanitorMetrics {
    /// Outcomes per resource type
    pub by_type: BTreeMap<&'static str, TypeCounters>,

    /// Total scan iterations completed
    pub scan_count: usize,

    /// Ledger keys pruned
    pub pruned: usize,

    /// Scope and adapter errors
    pub errors: usize,

    /// Total runtime in seconds
    pub total_runtime_secs: u64,
}

impl JanitorMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one scan into the totals
    pub fn record_scan(&mut self, report: &ScanReport, elapsed: Duration) {
        for scope in &report.scopes {
            for sweep in &scope.sweeps {
                let counters = self.by_type.entry(sweep.resource_type).or_default();
                counters.marked += sweep.marked;
                counters.deleted += sweep.deleted;
                counters.already_gone += sweep.already_gone;
                counters.failed += sweep.failed;
                counters.skipped += sweep.skipped;
            }
            self.pruned += scope.pruned;
            self.errors += scope.errors.len();
        }
        self.scan_count += 1;
        self.total_runtime_secs += elapsed.as_secs();
    }

    /// Get total resources deleted across all types
    pub fn total_deleted(&self) -> usize {
        self.by_type.values().map(|c| c.deleted).sum()
    }

    /// Get total failed deletions across all types
    pub fn total_failed(&self) -> usize {
        self.by_type.values().map(|c| c.failed).sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Janitor Metrics Summary".to_string(),
            "======================".to_string(),
            format!("Scans: {}", self.scan_count),
            format!("Total runtime: {}s", self.total_runtime_secs),
            format!("Pruned: {}", self.pruned),
            format!("Errors: {}", self.errors),
        ];

        if !self.by_type.is_empty() {
            lines.push(String::new());
            lines.push("By resource type:".to_string());
            for (name, c) in &self.by_type {
                lines.push(format!(
                    "  {}: {} deleted, {} already gone, {} failed, {} skipped ({} seen)",
                    name, c.deleted, c.already_gone, c.failed, c.skipped, c.marked
                ));
            }
            lines.push(format!("  Total deleted: {}", self.total_deleted()));
        }

        lines.join("\n")
    }
}
