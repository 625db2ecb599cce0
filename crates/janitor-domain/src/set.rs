//! Mark-and-sweep ledger
//!
//! The [`Set`] is the single source of truth for how long a resource has been
//! known to exist. Adapters call [`Set::mark`] for every live resource they
//! enumerate; the Set records the first time each key was seen and answers
//! whether the resource has outlived the retention TTL.
//!
//! # Lifecycle
//!
//! ```text
//! unseen -> tracked(age=0) -> tracked(age<ttl) -> eligible(age>=ttl)
//!        -> deleted | delete-failed (still tracked, retried next scan)
//!        -> absent (pruned by mark_complete once it stops appearing)
//! ```
//!
//! There is no status field: state is inferred from presence and age alone.

use crate::clock::{Clock, SystemClock};
use crate::identity::{ResourceIdentity, ResourceKey};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Persistable form of a [`Set`]: resource key -> first-observed timestamp
///
/// Backed by a `BTreeMap` so serialization is key-ordered and re-saving
/// unchanged data reproduces identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetSnapshot(BTreeMap<ResourceKey, DateTime<Utc>>);

impl SetSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry
    pub fn insert(&mut self, key: ResourceKey, first_seen: DateTime<Utc>) {
        self.0.insert(key, first_seen);
    }

    /// Look up the first-observed time of a key
    pub fn get(&self, key: &ResourceKey) -> Option<DateTime<Utc>> {
        self.0.get(key).copied()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKey, &DateTime<Utc>)> {
        self.0.iter()
    }
}

impl FromIterator<(ResourceKey, DateTime<Utc>)> for SetSnapshot {
    fn from_iter<I: IntoIterator<Item = (ResourceKey, DateTime<Utc>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Default)]
struct SetState {
    first_seen: HashMap<ResourceKey, DateTime<Utc>>,
    /// Keys re-confirmed by `mark` during the current pass
    marked: HashSet<ResourceKey>,
    dirty: bool,
}

/// Age-tracking ledger shared by every adapter within one scope
///
/// All mutation goes through an internal mutex, so a single `Set` can be
/// shared (`&Set` or `Arc<Set>`) by adapters issuing network calls
/// concurrently. The lock is never held across an `.await`.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use janitor_domain::clock::ManualClock;
/// use janitor_domain::{ResourceIdentity, Set};
/// use std::sync::Arc;
///
/// let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
/// let set = Set::with_clock(Duration::hours(24), clock.clone());
/// let queue = ResourceIdentity::new("arn:aws:sqs:us-east-1:111111111111:q1");
///
/// assert!(!set.mark(&queue, None)); // first sighting: grace period
/// clock.advance(Duration::hours(25));
/// assert!(set.mark(&queue, None)); // outlived the TTL
/// ```
pub struct Set {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<SetState>,
}

impl Set {
    /// Create an empty Set using the wall clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create an empty Set driven by `clock`
    ///
    /// Negative TTLs are treated as zero.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl: ttl.max(Duration::zero()),
            clock,
            state: Mutex::new(SetState::default()),
        }
    }

    /// Rebuild a Set from persisted state
    ///
    /// The restored Set is clean: nothing needs saving until it is mutated.
    pub fn from_snapshot(ttl: Duration, snapshot: SetSnapshot, clock: Arc<dyn Clock>) -> Self {
        let set = Self::with_clock(ttl, clock);
        set.lock().first_seen = snapshot.0.into_iter().collect();
        set
    }

    /// Build a zero-TTL Set seeded with every key first seen "now"
    ///
    /// This is what `ListAll` returns: sweeping against it makes every live
    /// resource eligible on its first `mark`, which is how purge mode deletes
    /// everything regardless of age.
    pub fn inventory<I>(keys: I, clock: Arc<dyn Clock>) -> Self
    where
        I: IntoIterator<Item = ResourceKey>,
    {
        let now = clock.now();
        let set = Self::with_clock(Duration::zero(), clock);
        {
            let mut state = set.lock();
            for key in keys {
                state.first_seen.entry(key).or_insert(now);
            }
        }
        set
    }

    fn lock(&self) -> MutexGuard<'_, SetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record that a resource is currently live and decide whether to delete it
    ///
    /// For a key never seen before, the first-observed time is `created` when
    /// the provider reports a creation time that is not in the future, and
    /// the current time otherwise. First sightings always return `false`.
    ///
    /// For a known key, returns `true` iff `now - first_seen >= ttl`. The
    /// recorded time is never changed, so repeated calls within one pass are
    /// harmless.
    pub fn mark(&self, identity: &ResourceIdentity, created: Option<DateTime<Utc>>) -> bool {
        let now = self.clock.now();
        let key = &identity.key;
        let mut state = self.lock();
        state.marked.insert(key.clone());

        if let Some(&first_seen) = state.first_seen.get(key) {
            return now.signed_duration_since(first_seen) >= self.ttl;
        }

        let first_seen = match created {
            Some(created) if created <= now => created,
            _ => now,
        };
        state.first_seen.insert(key.clone(), first_seen);
        state.dirty = true;
        false
    }

    /// Finish a complete pass: drop every key that was not marked
    ///
    /// Only call this after every adapter for the scope has finished its
    /// enumeration; a key owned by an adapter that never ran would otherwise
    /// lose its age. Returns the number of keys pruned.
    pub fn mark_complete(&self) -> usize {
        let mut state = self.lock();
        let state = &mut *state;
        let before = state.first_seen.len();
        let marked = &state.marked;
        state.first_seen.retain(|key, _| marked.contains(key));
        let pruned = before - state.first_seen.len();

        state.marked.clear();
        if pruned > 0 {
            state.dirty = true;
        }
        pruned
    }

    /// Abandon the current pass without pruning anything
    pub fn reset_pass(&self) {
        self.lock().marked.clear();
    }

    /// Number of keys marked during the current pass
    pub fn marked_count(&self) -> usize {
        self.lock().marked.len()
    }

    /// First-observed time of a key, if tracked
    pub fn first_seen(&self, key: &ResourceKey) -> Option<DateTime<Utc>> {
        self.lock().first_seen.get(key).copied()
    }

    /// Whether a key is tracked
    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.lock().first_seen.contains_key(key)
    }

    /// Tracked keys in sorted order
    pub fn keys(&self) -> Vec<ResourceKey> {
        let mut keys: Vec<_> = self.lock().first_seen.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.lock().first_seen.len()
    }

    /// True when nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.lock().first_seen.is_empty()
    }

    /// Retention TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether the mapping changed since it was loaded or last saved
    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    /// Flag the mapping as needing a save, e.g. after a failed write
    pub fn mark_dirty(&self) {
        self.lock().dirty = true;
    }

    /// Copy of the mapping for persistence
    pub fn snapshot(&self) -> SetSnapshot {
        Self::copy(&self.lock())
    }

    /// Copy the mapping and clear the dirty flag under one lock
    ///
    /// A `mark` that lands after this call sets the flag again, so a save
    /// of the returned snapshot can never hide a later change. Callers whose
    /// write fails should call [`Set::mark_dirty`].
    pub fn checkpoint(&self) -> SetSnapshot {
        let mut state = self.lock();
        state.dirty = false;
        Self::copy(&state)
    }

    fn copy(state: &SetState) -> SetSnapshot {
        SetSnapshot(
            state
                .first_seen
                .iter()
                .map(|(key, at)| (key.clone(), *at))
                .collect(),
        )
    }
}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Set")
            .field("ttl", &self.ttl)
            .field("tracked", &state.first_seen.len())
            .field("marked", &state.marked.len())
            .field("dirty", &state.dirty)
            .finish_non_exhaustive()
    }
}
