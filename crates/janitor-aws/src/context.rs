//! Shared AWS configuration context
//!
//! Provides `AwsContext` for loading AWS SDK configuration once and
//! creating per-region service clients from the same config.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;

/// Shared AWS configuration context for creating service clients.
///
/// Credentials and retry settings are resolved once; each client is then
/// built for whichever region the scope being swept targets.
///
/// # Example
/// ```ignore
/// let aws = AwsContext::load(Some("sandbox"), "us-east-1").await;
///
/// let sqs = aws.sqs_client("eu-west-1");
/// let events = aws.eventbridge_client("eu-west-1");
/// ```
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    home_region: String,
}

impl AwsContext {
    /// Load AWS configuration, optionally from a named profile.
    ///
    /// `home_region` is used for global calls (STS) and for the S3 state
    /// bucket.
    pub async fn load(profile: Option<&str>, home_region: &str) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(home_region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        Self {
            config: Arc::new(config),
            home_region: home_region.to_string(),
        }
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Region used for global calls
    pub fn home_region(&self) -> &str {
        &self.home_region
    }

    /// Create an SQS client for `region`.
    pub fn sqs_client(&self, region: &str) -> aws_sdk_sqs::Client {
        let config = aws_sdk_sqs::config::Builder::from(self.sdk_config())
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_sqs::Client::from_conf(config)
    }

    /// Create an EventBridge client for `region`.
    pub fn eventbridge_client(&self, region: &str) -> aws_sdk_eventbridge::Client {
        let config = aws_sdk_eventbridge::config::Builder::from(self.sdk_config())
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_eventbridge::Client::from_conf(config)
    }

    /// Create an S3 client in the home region.
    pub fn s3_client(&self) -> aws_sdk_s3::Client {
        aws_sdk_s3::Client::new(self.sdk_config())
    }

    /// Create an STS client in the home region.
    pub fn sts_client(&self) -> aws_sdk_sts::Client {
        aws_sdk_sts::Client::new(self.sdk_config())
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("home_region", &self.home_region)
            .finish_non_exhaustive()
    }
}
