//! Local filesystem state store

use crate::error::StoreError;
use async_trait::async_trait;
use janitor_domain::StateStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// State store writing one JSON file per scope
///
/// A scope key `account/region` lives at `<root>/<account>/<region>.json`.
/// Saves go through a temporary file and a rename, so readers never observe
/// a partially written ledger.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    root: PathBuf,
}

impl FileStateStore {
    /// Create a store rooted at `root` (created lazily on first save)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `scope_key`
    ///
    /// Each `/`-separated component is sanitized so that no key can resolve
    /// outside the root directory.
    pub fn path_for(&self, scope_key: &str) -> PathBuf {
        let mut components: Vec<String> = scope_key.split('/').map(sanitize).collect();
        let mut path = self.root.clone();
        if let Some(last) = components.pop() {
            for component in components {
                path.push(component);
            }
            path.push(format!("{}.json", last));
        }
        path
    }
}

fn sanitize(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    type Error = StoreError;

    async fn load(&self, scope_key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(scope_key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No saved ledger");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, scope_key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path_for(scope_key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(path = %path.display(), bytes = bytes.len(), "Saved ledger");
        Ok(())
    }
}
