//! Scope - one (account, region) pair and the options every adapter call sees

use crate::tags::TagFilter;
use chrono::Duration;
use std::fmt;

/// Options for one account/region sweep
///
/// Passed to every adapter call. `dry_run` suppresses deletion but adapters
/// still mark resources so that age tracking stays accurate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Target account id
    pub account: String,

    /// Target region
    pub region: String,

    /// Minimum tracked age before a resource becomes eligible for deletion
    pub ttl: Duration,

    /// When true, log deletions instead of performing them
    pub dry_run: bool,

    /// Which resources the janitor manages
    pub tags: TagFilter,
}

impl Scope {
    /// Create a scope with an empty tag filter
    pub fn new(account: impl Into<String>, region: impl Into<String>, ttl: Duration) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
            ttl,
            dry_run: false,
            tags: TagFilter::default(),
        }
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Replace the tag filter
    pub fn with_tags(mut self, tags: TagFilter) -> Self {
        self.tags = tags;
        self
    }

    /// Persistence key for this scope's ledger: `account/region`
    pub fn key(&self) -> String {
        format!("{}/{}", self.account, self.region)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account, self.region)?;
        if self.dry_run {
            f.write_str(" (dry run)")?;
        }
        Ok(())
    }
}
