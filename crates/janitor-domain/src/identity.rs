//! Resource identity - the stable key every tracked resource is filed under

use serde::{Deserialize, Serialize};
use std::fmt;

/// Globally unique, stable key for a physical cloud resource
///
/// Keys encode service, region, account and resource name (for AWS this is
/// the ARN). Two observations of the same resource must produce the same key,
/// and no two distinct resources may share one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Create a key from its canonical string form
    ///
    /// # Examples
    ///
    /// ```
    /// use janitor_domain::ResourceKey;
    ///
    /// let key = ResourceKey::new("arn:aws:sqs:us-east-1:111111111111:jobs");
    /// assert_eq!(key.as_str(), "arn:aws:sqs:us-east-1:111111111111:jobs");
    /// ```
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourceKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity of one observed resource
///
/// Built fresh by an adapter on every enumeration and never persisted itself;
/// only its [`ResourceKey`] ends up in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentity {
    /// Canonical unique key
    pub key: ResourceKey,

    /// Optional human-meaningful label (queue URL, rule name, ...)
    pub label: Option<String>,
}

impl ResourceIdentity {
    /// Create an identity without a display label
    pub fn new(key: impl Into<ResourceKey>) -> Self {
        Self {
            key: key.into(),
            label: None,
        }
    }

    /// Attach a display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} ({})", self.key, label),
            None => write!(f, "{}", self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_display() {
        let plain = ResourceIdentity::new("arn:aws:events:us-east-1:1:rule/nightly");
        assert_eq!(plain.to_string(), "arn:aws:events:us-east-1:1:rule/nightly");

        let labelled = ResourceIdentity::new("arn:aws:sqs:us-east-1:1:jobs")
            .with_label("https://sqs.us-east-1.amazonaws.com/1/jobs");
        assert_eq!(
            labelled.to_string(),
            "arn:aws:sqs:us-east-1:1:jobs (https://sqs.us-east-1.amazonaws.com/1/jobs)"
        );
    }

    #[test]
    fn test_key_equality_ignores_label() {
        let a = ResourceIdentity::new("k").with_label("first");
        let b = ResourceIdentity::new("k").with_label("second");
        assert_eq!(a.key, b.key);
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_ordering_is_lexicographic() {
        let a = ResourceKey::new("arn:aws:events:us-east-1:1:rule/a");
        let b = ResourceKey::new("arn:aws:sqs:us-east-1:1:a");
        assert!(a < b);
    }
}
