//! Shared mark-then-delete pass used by every adapter
//!
//! Adapters enumerate their resources into [`Candidate`]s and hand them to
//! [`sweep`], which marks each one against the ledger and deletes whatever
//! the ledger says has expired. One failing delete never stops the rest.

use crate::identity::ResourceIdentity;
use crate::scope::Scope;
use crate::set::Set;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use tracing::{debug, info, warn};

/// Successful result of a delete call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The resource was deleted by this call
    Deleted,
    /// The provider reported the resource as already gone
    AlreadyGone,
}

/// One enumerated resource awaiting a keep/delete decision
#[derive(Debug, Clone)]
pub struct Candidate<R> {
    /// Identity used for marking and logging
    pub identity: ResourceIdentity,

    /// Authoritative creation time, when the provider reports one
    pub created: Option<DateTime<Utc>>,

    /// Adapter-specific handle needed to delete the resource
    pub resource: R,
}

impl<R> Candidate<R> {
    /// Create a candidate without a known creation time
    pub fn new(identity: ResourceIdentity, resource: R) -> Self {
        Self {
            identity,
            created: None,
            resource,
        }
    }

    /// Attach the provider-reported creation time
    pub fn created_at(mut self, created: Option<DateTime<Utc>>) -> Self {
        self.created = created;
        self
    }
}

/// Counters for one adapter pass in one scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Adapter name
    pub resource_type: &'static str,
    /// Resources marked as live
    pub marked: usize,
    /// Resources skipped by the tag filter or as provider-managed
    pub exempt: usize,
    /// Resources the ledger flagged for deletion
    pub eligible: usize,
    /// Deleted by this pass
    pub deleted: usize,
    /// Already gone when we tried to delete them
    pub already_gone: usize,
    /// Delete calls that failed (retried next scan)
    pub failed: usize,
    /// Eligible but not deleted because of dry-run
    pub skipped: usize,
}

impl SweepReport {
    /// Empty report for `resource_type`
    pub fn new(resource_type: &'static str) -> Self {
        Self {
            resource_type,
            ..Default::default()
        }
    }
}

/// Mark every candidate, then delete the expired ones
///
/// All marks happen before any delete call so that a slow or failing delete
/// cannot leave part of the enumeration unmarked. Delete failures are logged
/// at `warn` and counted; the resource stays in the ledger and is retried on
/// the next scan. In dry-run mode the intent is logged and nothing is
/// deleted.
pub async fn sweep<R, F, Fut, E>(
    resource_type: &'static str,
    scope: &Scope,
    set: &Set,
    candidates: Vec<Candidate<R>>,
    mut delete: F,
) -> SweepReport
where
    F: FnMut(R) -> Fut,
    Fut: Future<Output = Result<DeleteOutcome, E>>,
    E: fmt::Display,
{
    let mut report = SweepReport::new(resource_type);
    let mut expired = Vec::new();

    for candidate in candidates {
        report.marked += 1;
        if set.mark(&candidate.identity, candidate.created) {
            report.eligible += 1;
            expired.push(candidate);
        }
    }

    for candidate in expired {
        let identity = candidate.identity;
        if scope.dry_run {
            info!(scope = %scope, resource_type, key = %identity, "DRY RUN: would delete");
            report.skipped += 1;
            continue;
        }

        warn!(scope = %scope, resource_type, key = %identity, "Deleting");
        match delete(candidate.resource).await {
            Ok(DeleteOutcome::Deleted) => report.deleted += 1,
            Ok(DeleteOutcome::AlreadyGone) => {
                debug!(scope = %scope, resource_type, key = %identity, "Already gone");
                report.already_gone += 1;
            }
            Err(e) => {
                warn!(
                    scope = %scope,
                    resource_type,
                    key = %identity,
                    error = %e,
                    "Delete failed"
                );
                report.failed += 1;
            }
        }
    }

    debug!(
        scope = %scope,
        resource_type,
        marked = report.marked,
        eligible = report.eligible,
        deleted = report.deleted,
        failed = report.failed,
        "Sweep pass finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone};
    use std::sync::{Arc, Mutex};

    fn setup(ttl_hours: i64) -> (Arc<ManualClock>, Set, Scope) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        ));
        let set = Set::with_clock(Duration::hours(ttl_hours), clock.clone());
        let scope = Scope::new("111111111111", "us-east-1", Duration::hours(ttl_hours));
        (clock, set, scope)
    }

    fn candidates(names: &[&str]) -> Vec<Candidate<String>> {
        names
            .iter()
            .map(|n| Candidate::new(ResourceIdentity::new(format!("key/{}", n)), n.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_nothing_deleted_on_first_sight() {
        let (_clock, set, scope) = setup(0);
        let deleted = Mutex::new(Vec::new());
        let report = sweep("test", &scope, &set, candidates(&["a", "b"]), |name| {
            deleted.lock().unwrap().push(name);
            async { Ok::<_, String>(DeleteOutcome::Deleted) }
        })
        .await;

        assert_eq!(report.marked, 2);
        assert_eq!(report.eligible, 0);
        assert!(deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_the_rest() {
        let (clock, set, scope) = setup(1);
        let names = ["a", "b", "c", "d"];
        sweep("test", &scope, &set, candidates(&names), |_| async {
            Ok::<_, String>(DeleteOutcome::Deleted)
        })
        .await;
        clock.advance(Duration::hours(2));

        let attempted = Mutex::new(Vec::new());
        let report = sweep("test", &scope, &set, candidates(&names), |name| {
            attempted.lock().unwrap().push(name.clone());
            async move {
                if name == "b" {
                    Err("InternalError".to_string())
                } else {
                    Ok(DeleteOutcome::Deleted)
                }
            }
        })
        .await;

        assert_eq!(attempted.lock().unwrap().len(), 4);
        assert_eq!(report.deleted, 3);
        assert_eq!(report.failed, 1);
        // Failed resource is still tracked with its original age
        assert_eq!(
            set.first_seen(&ResourceIdentity::new("key/b").key),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_already_gone_counts_as_success() {
        let (clock, set, scope) = setup(1);
        sweep("test", &scope, &set, candidates(&["x"]), |_| async {
            Ok::<_, String>(DeleteOutcome::Deleted)
        })
        .await;
        clock.advance(Duration::hours(1));

        let report = sweep("test", &scope, &set, candidates(&["x"]), |_| async {
            Ok::<_, String>(DeleteOutcome::AlreadyGone)
        })
        .await;
        assert_eq!(report.already_gone, 1);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_dry_run_marks_but_never_deletes() {
        let (clock, set, scope) = setup(0);
        let scope = scope.with_dry_run(true);
        let calls = Mutex::new(0usize);

        for _ in 0..2 {
            sweep("test", &scope, &set, candidates(&["q2"]), |_| {
                *calls.lock().unwrap() += 1;
                async { Ok::<_, String>(DeleteOutcome::Deleted) }
            })
            .await;
            clock.advance(Duration::minutes(1));
        }

        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(set.contains(&ResourceIdentity::new("key/q2").key));
    }

    #[tokio::test]
    async fn test_dry_run_reports_skipped() {
        let (clock, set, scope) = setup(0);
        let scope = scope.with_dry_run(true);
        sweep("test", &scope, &set, candidates(&["a"]), |_| async {
            Ok::<_, String>(DeleteOutcome::Deleted)
        })
        .await;
        clock.advance(Duration::seconds(1));
        let report = sweep("test", &scope, &set, candidates(&["a"]), |_| async {
            Ok::<_, String>(DeleteOutcome::Deleted)
        })
        .await;
        assert_eq!(report.eligible, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.deleted, 0);
    }
}
