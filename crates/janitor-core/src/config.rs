//! Configuration for Janitor operations
//!
//! Defines the retention TTL, per-call timeouts, concurrency and which
//! resource types and tags a scan covers.

use crate::JanitorError;
use janitor_domain::{TagFilter, TagMatcher};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted TTL (100 years)
pub const MAX_TTL_HOURS: u64 = 24 * 365 * 100;

/// Configuration for the Janitor service
///
/// # Examples
///
/// ```
/// use janitor_core::JanitorConfig;
///
/// let config = JanitorConfig::default();
/// assert_eq!(config.ttl_hours, 24);
/// assert!(config.is_type_enabled("sqs-queues"));
///
/// let config: JanitorConfig = toml::from_str("ttl_hours = 6\ndisabled_types = [\"sqs-queues\"]").unwrap();
/// assert_eq!(config.ttl().num_hours(), 6);
/// assert!(!config.is_type_enabled("sqs-queues"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JanitorConfig {
    /// Minimum tracked age before a resource is deleted (in hours)
    /// Default: 24 hours
    pub ttl_hours: u64,

    /// Dry-run mode: Log what would be deleted without actually deleting
    /// Default: false
    pub dry_run: bool,

    /// Per-adapter call timeout (in seconds)
    /// Default: 300
    pub adapter_timeout_secs: u64,

    /// Account/region scopes scanned at once
    /// Default: 4
    pub max_concurrent_scopes: usize,

    /// How often the worker runs a scan (in minutes)
    /// Default: Every 60 minutes (hourly)
    pub sweep_interval_minutes: u64,

    /// Resource types to sweep; empty means all of them
    pub enabled_types: Vec<String>,

    /// Resource types never to sweep (wins over `enabled_types`)
    pub disabled_types: Vec<String>,

    /// Only resources carrying all of these tags are managed
    pub include_tags: Vec<TagMatcher>,

    /// Resources carrying any of these tags are left alone
    pub exclude_tags: Vec<TagMatcher>,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            dry_run: false,
            adapter_timeout_secs: 300,
            max_concurrent_scopes: 4,
            sweep_interval_minutes: 60,
            enabled_types: Vec::new(),
            disabled_types: Vec::new(),
            include_tags: Vec::new(),
            exclude_tags: Vec::new(),
        }
    }
}

impl JanitorConfig {
    /// Get the retention TTL
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours.min(MAX_TTL_HOURS) as i64)
    }

    /// Get the per-adapter timeout as Duration
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout_secs)
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes * 60)
    }

    /// Tag filter built from `include_tags` and `exclude_tags`
    pub fn tag_filter(&self) -> TagFilter {
        TagFilter {
            include: self.include_tags.clone(),
            exclude: self.exclude_tags.clone(),
        }
    }

    /// Whether resource type `name` takes part in scans
    pub fn is_type_enabled(&self, name: &str) -> bool {
        if self.disabled_types.iter().any(|t| t == name) {
            return false;
        }
        self.enabled_types.is_empty() || self.enabled_types.iter().any(|t| t == name)
    }

    /// Reject settings that cannot work
    ///
    /// `known_types` is the list of registered resource type names; naming
    /// any other type is an error so that typos do not silently disable
    /// cleanup.
    pub fn validate(&self, known_types: &[&str]) -> Result<(), JanitorError> {
        if self.ttl_hours > MAX_TTL_HOURS {
            return Err(JanitorError::Config(format!(
                "ttl_hours must be at most {}",
                MAX_TTL_HOURS
            )));
        }
        if self.adapter_timeout_secs == 0 {
            return Err(JanitorError::Config("adapter_timeout_secs must be positive".into()));
        }
        if self.max_concurrent_scopes == 0 {
            return Err(JanitorError::Config("max_concurrent_scopes must be positive".into()));
        }
        if self.sweep_interval_minutes == 0 {
            return Err(JanitorError::Config("sweep_interval_minutes must be positive".into()));
        }
        for name in self.enabled_types.iter().chain(&self.disabled_types) {
            if !known_types.contains(&name.as_str()) {
                return Err(JanitorError::Config(format!(
                    "Unknown resource type '{}' (known: {})",
                    name,
                    known_types.join(", ")
                )));
            }
        }
        Ok(())
    }
}
