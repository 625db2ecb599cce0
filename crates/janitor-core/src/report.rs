//! Results of a scan

use crate::JanitorError;
use janitor_domain::SweepReport;
use serde::{Serialize, Serializer};

/// Outcome of one account/region scope
#[derive(Debug, Default, Serialize)]
pub struct ScopeReport {
    /// Scope key (`account/region`)
    pub scope: String,

    /// Whether deletions were suppressed
    pub dry_run: bool,

    /// One entry per adapter pass that finished
    pub sweeps: Vec<SweepReport>,

    /// Everything that went wrong in this scope
    #[serde(serialize_with = "errors_as_strings")]
    pub errors: Vec<JanitorError>,

    /// Keys dropped from the ledger because they were not seen
    pub pruned: usize,

    /// Keys tracked after the scan
    pub tracked: usize,

    /// Whether the ledger was written back
    pub persisted: bool,

    /// Whether cancellation cut the scope short
    pub cancelled: bool,
}

fn errors_as_strings<S: Serializer>(errors: &[JanitorError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(|e| e.to_string()))
}

impl ScopeReport {
    /// Empty report for `scope`
    pub fn new(scope: impl Into<String>, dry_run: bool) -> Self {
        Self {
            scope: scope.into(),
            dry_run,
            ..Default::default()
        }
    }

    /// True when nothing went wrong
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Resources deleted in this scope
    pub fn deleted(&self) -> usize {
        self.sweeps.iter().map(|s| s.deleted).sum()
    }

    /// Resources that were due for deletion in this scope
    pub fn eligible(&self) -> usize {
        self.sweeps.iter().map(|s| s.eligible).sum()
    }
}

/// Aggregated outcome of a scan over many scopes
#[derive(Debug, Default, Serialize)]
pub struct ScanReport {
    /// Per-scope results, in the order the scopes were given
    pub scopes: Vec<ScopeReport>,
}

impl ScanReport {
    /// Every error from every scope
    pub fn errors(&self) -> impl Iterator<Item = &JanitorError> {
        self.scopes.iter().flat_map(|s| s.errors.iter())
    }

    /// Number of errors across all scopes
    pub fn error_count(&self) -> usize {
        self.scopes.iter().map(|s| s.errors.len()).sum()
    }

    /// True when no scope reported an error
    pub fn is_success(&self) -> bool {
        self.scopes.iter().all(ScopeReport::is_success)
    }

    /// Resources deleted across all scopes
    pub fn total_deleted(&self) -> usize {
        self.scopes.iter().map(ScopeReport::deleted).sum()
    }

    /// Resources due for deletion across all scopes
    pub fn total_eligible(&self) -> usize {
        self.scopes.iter().map(ScopeReport::eligible).sum()
    }

    /// Keys pruned across all scopes
    pub fn total_pruned(&self) -> usize {
        self.scopes.iter().map(|s| s.pruned).sum()
    }

    /// Human-readable report
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for scope in &self.scopes {
            let mut header = format!("{}:", scope.scope);
            if scope.dry_run {
                header.push_str(" (dry run)");
            }
            if scope.cancelled {
                header.push_str(" (cancelled)");
            }
            lines.push(header);

            for sweep in &scope.sweeps {
                lines.push(format!(
                    "  {}: {} seen, {} eligible, {} deleted, {} already gone, {} failed, {} skipped, {} exempt",
                    sweep.resource_type,
                    sweep.marked,
                    sweep.eligible,
                    sweep.deleted,
                    sweep.already_gone,
                    sweep.failed,
                    sweep.skipped,
                    sweep.exempt
                ));
            }
            lines.push(format!(
                "  ledger: {} tracked, {} pruned{}",
                scope.tracked,
                scope.pruned,
                if scope.persisted { ", saved" } else { "" }
            ));
            for error in &scope.errors {
                lines.push(format!("  error: {}", error));
            }
        }
        lines.push(format!(
            "Total: {} scopes, {} deleted, {} errors",
            self.scopes.len(),
            self.total_deleted(),
            self.error_count()
        ));
        lines.join("\n")
    }
}
