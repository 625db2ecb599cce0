//! Error types for adapter operations

use crate::scope::Scope;
use thiserror::Error;

/// Boxed error from a cloud SDK or other backend
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure while paging through a list API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    /// The service handed back a continuation token it already returned
    #[error("Pagination stalled: token '{0}' was returned twice")]
    Stalled(String),

    /// More pages than the configured ceiling
    #[error("Pagination exceeded {0} pages")]
    TooManyPages(usize),
}

/// Errors an adapter pass can fail with
///
/// Deletion failures of individual resources are not errors at this level:
/// they are logged and counted in the sweep report.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// Listing live resources failed (auth, network, throttling, ...)
    #[error("Failed to enumerate {resource_type} in {scope}: {source}")]
    Enumeration {
        /// Adapter name
        resource_type: &'static str,
        /// Scope key (`account/region`)
        scope: String,
        /// Underlying failure
        #[source]
        source: BoxError,
    },

    /// A list API misbehaved while paging
    #[error("Pagination error: {0}")]
    Pagination(#[from] PaginationError),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl ResourceError {
    /// Wrap a listing failure for `resource_type` in `scope`
    pub fn enumeration(
        resource_type: &'static str,
        scope: &Scope,
        source: impl Into<BoxError>,
    ) -> Self {
        ResourceError::Enumeration {
            resource_type,
            scope: scope.key(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_enumeration_error_message() {
        let scope = Scope::new("111111111111", "us-east-1", Duration::hours(1));
        let err = ResourceError::enumeration("sqs-queues", &scope, "access denied");
        assert_eq!(
            err.to_string(),
            "Failed to enumerate sqs-queues in 111111111111/us-east-1: access denied"
        );
    }

    #[test]
    fn test_pagination_error_converts() {
        let err: ResourceError = PaginationError::Stalled("abc".to_string()).into();
        assert!(matches!(err, ResourceError::Pagination(PaginationError::Stalled(_))));
    }
}
