//! Janitor Domain Layer
//!
//! This crate contains the core mark-and-sweep logic for the cloud janitor.
//! It knows nothing about any particular cloud SDK and defines the concepts
//! and trait interfaces every other crate depends upon.
//!
//! ## Key Concepts
//!
//! - **Resource key**: stable identity string for one physical resource
//! - **Set**: ledger of first-seen times; decides which resources have expired
//! - **Scope**: one account/region pair plus the options for a scan
//! - **ResourceType**: adapter contract for one kind of cloud resource
//! - **StateStore**: durable byte storage for per-scope ledgers
//!
//! ## Lifecycle
//!
//! A resource is recorded the first time it is seen and becomes eligible for
//! deletion once its tracked age reaches the TTL. Keys that are not
//! re-confirmed during a complete scan are pruned.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod error;
pub mod identity;
pub mod pagination;
pub mod scope;
pub mod set;
pub mod sweep;
pub mod tags;
pub mod traits;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{BoxError, PaginationError, ResourceError};
pub use identity::{ResourceIdentity, ResourceKey};
pub use pagination::{drain_pages, Page};
pub use scope::Scope;
pub use set::{Set, SetSnapshot};
pub use sweep::{sweep, Candidate, DeleteOutcome, SweepReport};
pub use tags::{TagFilter, TagMatcher};
pub use traits::{ResourceType, StateStore};
