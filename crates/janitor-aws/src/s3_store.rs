//! S3-backed ledger storage

use crate::context::AwsContext;
use crate::error::{classify, AwsError};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use janitor_domain::StateStore;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Bucket and key prefix parsed from `s3://bucket/prefix`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    /// Bucket name
    pub bucket: String,
    /// Key prefix without leading or trailing slashes (may be empty)
    pub prefix: String,
}

impl S3Location {
    /// Object key holding the ledger for `scope_key`
    pub fn object_key(&self, scope_key: &str) -> String {
        if self.prefix.is_empty() {
            format!("{}.json", scope_key)
        } else {
            format!("{}/{}.json", self.prefix, scope_key)
        }
    }
}

impl FromStr for S3Location {
    type Err = AwsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("s3://")
            .ok_or_else(|| AwsError::Invalid(format!("Not an s3:// URL: {}", s)))?;
        let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(AwsError::Invalid(format!("Missing bucket in {}", s)));
        }
        Ok(Self {
            bucket: bucket.to_string(),
            prefix: prefix.trim_matches('/').to_string(),
        })
    }
}

impl fmt::Display for S3Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.prefix)
    }
}

/// State store keeping one JSON object per scope in S3
pub struct S3StateStore {
    client: Client,
    location: S3Location,
}

impl S3StateStore {
    /// Create a store writing under `location`
    pub fn from_context(ctx: &AwsContext, location: S3Location) -> Self {
        Self {
            client: ctx.s3_client(),
            location,
        }
    }

    /// Where ledgers are written
    pub fn location(&self) -> &S3Location {
        &self.location
    }
}

impl fmt::Debug for S3StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3StateStore")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StateStore for S3StateStore {
    type Error = AwsError;

    async fn load(&self, scope_key: &str) -> Result<Option<Vec<u8>>, AwsError> {
        let key = self.location.object_key(scope_key);
        let out = match self
            .client
            .get_object()
            .bucket(&self.location.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(out) => out,
            Err(e) => {
                let err = classify(&e);
                // A missing bucket is a configuration problem, not an empty ledger
                return match err {
                    AwsError::NotFound { ref code, .. } if code == "NoSuchKey" => {
                        debug!(bucket = %self.location.bucket, key = %key, "No saved ledger");
                        Ok(None)
                    }
                    err => Err(err),
                };
            }
        };

        let bytes = out.body.collect().await.map_err(|e| AwsError::Sdk {
            code: None,
            message: format!("Failed to read s3://{}/{}: {}", self.location.bucket, key, e),
        })?;
        Ok(Some(bytes.into_bytes().to_vec()))
    }

    async fn save(&self, scope_key: &str, bytes: Vec<u8>) -> Result<(), AwsError> {
        let key = self.location.object_key(scope_key);
        debug!(bucket = %self.location.bucket, key = %key, size = bytes.len(), "Uploading ledger");

        self.client
            .put_object()
            .bucket(&self.location.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| classify(&e))?;
        Ok(())
    }
}
