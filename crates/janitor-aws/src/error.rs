//! AWS error classification and handling
//!
//! Classifies SDK errors by the service error code (`.code()`) instead of
//! matching on their Debug output.

use aws_sdk_sqs::error::ProvideErrorMetadata;
use janitor_domain::PaginationError;
use thiserror::Error;

/// AWS error categories used by the adapters and the S3 state store
#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource was not found (already gone when deleting)
    #[error("Resource not found ({code}): {message}")]
    NotFound {
        /// Service error code
        code: String,
        /// Service error message
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded ({code})")]
    Throttled {
        /// Service error code
        code: String,
    },

    /// Any other SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        /// Service error code, when the service returned one
        code: Option<String>,
        /// Service error message
        message: String,
    },

    /// Malformed input that never reached AWS
    #[error("{0}")]
    Invalid(String),
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is a throttling error
    pub fn is_throttled(&self) -> bool {
        matches!(self, AwsError::Throttled { .. })
    }
}

impl From<PaginationError> for AwsError {
    fn from(err: PaginationError) -> Self {
        AwsError::Invalid(err.to_string())
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "AWS.SimpleQueueService.NonExistentQueue",
    "QueueDoesNotExist",
    "ResourceNotFoundException",
    "NoSuchKey",
    "NoSuchBucket",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestThrottled",
    "RequestLimitExceeded",
    "TooManyRequestsException",
];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound {
            code: c.to_string(),
            message,
        },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled {
            code: c.to_string(),
        },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify any SDK error that carries service error metadata.
///
/// Errors without a service code (timeouts, dispatch failures) keep the
/// SDK's own description as the message.
pub fn classify<E>(error: &E) -> AwsError
where
    E: ProvideErrorMetadata + std::fmt::Display,
{
    match (error.code(), error.message()) {
        (None, None) => AwsError::Sdk {
            code: None,
            message: error.to_string(),
        },
        (code, message) => classify_aws_error(code, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes() {
        for code in NOT_FOUND_CODES {
            let err = classify_aws_error(Some(code), Some("some message"));
            assert!(err.is_not_found(), "Expected NotFound for code: {code}");
        }
    }

    #[test]
    fn throttling_codes() {
        for code in THROTTLING_CODES {
            let err = classify_aws_error(Some(code), Some("msg"));
            assert!(err.is_throttled(), "Expected Throttled for code: {code}");
        }
    }

    #[test]
    fn unknown_and_missing_codes() {
        let err = classify_aws_error(Some("AccessDenied"), Some("not allowed"));
        assert!(matches!(err, AwsError::Sdk { code: Some(ref c), .. } if c == "AccessDenied"));
        assert_eq!(err.to_string(), "AWS error: not allowed");

        let err2 = classify_aws_error(None, Some("something failed"));
        assert!(matches!(err2, AwsError::Sdk { code: None, .. }));
        assert_eq!(err2.to_string(), "AWS error: something failed");
    }

    #[test]
    fn stalled_pagination_is_not_a_missing_resource() {
        let err: AwsError = PaginationError::Stalled("t".to_string()).into();
        assert!(matches!(err, AwsError::Invalid(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn sqs_missing_queue_is_not_found() {
        let err = classify_aws_error(
            Some("AWS.SimpleQueueService.NonExistentQueue"),
            Some("The specified queue does not exist."),
        );
        assert!(err.is_not_found());
    }
}
