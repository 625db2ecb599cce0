//! Tag-based exemption
//!
//! Adapters consult a [`TagFilter`] before marking a resource so that
//! operators can restrict the janitor to resources carrying (or lacking)
//! particular tags.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A single tag condition: `key` (any value) or `key=value`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagMatcher {
    /// Tag key
    pub key: String,

    /// Required value, or `None` to match any value
    pub value: Option<String>,
}

impl TagMatcher {
    /// Whether `tags` satisfies this condition
    pub fn matches(&self, tags: &HashMap<String, String>) -> bool {
        match (tags.get(&self.key), &self.value) {
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
            (None, _) => false,
        }
    }
}

impl FromStr for TagMatcher {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = match s.split_once('=') {
            Some((key, value)) => (key.trim(), Some(value.trim().to_string())),
            None => (s.trim(), None),
        };
        if key.is_empty() {
            return Err(format!("Invalid tag matcher '{}': empty key", s));
        }
        Ok(Self {
            key: key.to_string(),
            value,
        })
    }
}

impl TryFrom<String> for TagMatcher {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TagMatcher> for String {
    fn from(matcher: TagMatcher) -> Self {
        matcher.to_string()
    }
}

impl fmt::Display for TagMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.key, value),
            None => f.write_str(&self.key),
        }
    }
}

/// Include/exclude tag rules deciding which resources the janitor manages
///
/// A resource is managed when it carries every include tag and none of the
/// exclude tags. An empty filter manages everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    /// All of these must match
    #[serde(default)]
    pub include: Vec<TagMatcher>,

    /// None of these may match
    #[serde(default)]
    pub exclude: Vec<TagMatcher>,
}

impl TagFilter {
    /// Filter that manages every resource
    pub fn all() -> Self {
        Self::default()
    }

    /// True when no rules are configured (adapters can skip tag lookups)
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Whether a resource with `tags` is managed by the janitor
    pub fn is_managed(&self, tags: &HashMap<String, String>) -> bool {
        self.include.iter().all(|m| m.matches(tags))
            && !self.exclude.iter().any(|m| m.matches(tags))
    }
}
