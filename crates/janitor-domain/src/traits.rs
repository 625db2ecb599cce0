//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the ledger and the cloud.
//! Implementations live in other crates (janitor-aws, janitor-store).

use crate::error::ResourceError;
use crate::scope::Scope;
use crate::set::Set;
use crate::sweep::SweepReport;
use async_trait::async_trait;

/// One kind of cloud resource the janitor can enumerate and delete
///
/// Implemented by the infrastructure layer (janitor-aws). Adapters share no
/// state with each other; the orchestrator holds them as
/// `Arc<dyn ResourceType>` in a registration list.
#[async_trait]
pub trait ResourceType: Send + Sync {
    /// Stable type name used in logs and for enable/disable selection
    fn name(&self) -> &'static str;

    /// Enumerate every live resource in `scope`
    ///
    /// Returns a zero-TTL [`Set`] seeded with the current time for each key.
    /// Multi-page responses are drained before returning.
    async fn list_all(&self, scope: &Scope) -> Result<Set, ResourceError>;

    /// Mark every live resource in `set` and delete the expired ones
    ///
    /// Individual delete failures are logged and counted in the returned
    /// report; only a failure to enumerate is an error.
    async fn mark_and_sweep(&self, scope: &Scope, set: &Set) -> Result<SweepReport, ResourceError>;
}

/// Durable byte storage for per-scope ledgers
///
/// Implemented by the infrastructure layer (janitor-store, janitor-aws)
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Error type for store operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the ledger bytes for `scope_key`, or `None` if nothing was saved
    async fn load(&self, scope_key: &str) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Replace the ledger bytes for `scope_key`
    async fn save(&self, scope_key: &str, bytes: Vec<u8>) -> Result<(), Self::Error>;
}
