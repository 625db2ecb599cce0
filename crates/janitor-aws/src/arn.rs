//! ARN construction - resource keys for AWS resources

use janitor_domain::{ResourceKey, Scope};
use std::fmt;

/// An Amazon Resource Name in the `aws` partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    /// Service namespace (`sqs`, `events`, ...)
    pub service: &'static str,
    /// Region the resource lives in
    pub region: String,
    /// Owning account
    pub account: String,
    /// Service-specific resource part
    pub resource: String,
}

impl Arn {
    /// ARN for a resource in `scope`
    pub fn in_scope(service: &'static str, scope: &Scope, resource: impl Into<String>) -> Self {
        Self {
            service,
            region: scope.region.clone(),
            account: scope.account.clone(),
            resource: resource.into(),
        }
    }

    /// Convert into a ledger key
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.to_string())
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:aws:{}:{}:{}:{}",
            self.service, self.region, self.account, self.resource
        )
    }
}
