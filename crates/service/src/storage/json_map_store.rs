use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::Value;
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

/// In-memory `String`-keyed map mirrored to a pretty-printed JSON file.
///
/// Every mutation rewrites the whole file while the write lock is held, so
/// the file never runs ahead of memory. A failed write leaves the in-memory
/// change in place and is reported to the caller.
pub struct JsonMapStore<V> {
    inner: RwLock<BTreeMap<String, V>>,
    file_path: PathBuf,
}

/// Read and parse the document at `path`. A missing file is `Ok(None)`.
pub async fn read_document(path: &Path) -> Result<Option<Value>, ServiceError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ServiceError::Io(e.to_string())),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| ServiceError::Decode(e.to_string()))
}

impl<V> JsonMapStore<V>
where
    V: Serialize + Clone + Send + Sync,
{
    /// Wrap already-loaded entries. Nothing is written until the next mutation or `save`.
    pub fn with_entries<P: Into<PathBuf>>(path: P, entries: BTreeMap<String, V>) -> Self {
        Self { inner: RwLock::new(entries), file_path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    async fn write_file(&self, map: &BTreeMap<String, V>) -> Result<(), ServiceError> {
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| ServiceError::Io(e.to_string()))?;
        }
        let data = serde_json::to_vec_pretty(map).map_err(|e| ServiceError::Decode(e.to_string()))?;
        fs::write(&self.file_path, data).await.map_err(|e| ServiceError::Io(e.to_string()))?;
        Ok(())
    }

    /// Rewrite the file from the current map.
    pub async fn save(&self) -> Result<(), ServiceError> {
        let map = self.inner.write().await;
        self.write_file(&map).await
    }

    /// List all entries as `(key, value)` pairs, ordered by key.
    pub async fn list(&self) -> Vec<(String, V)> {
        let map = self.inner.read().await;
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Insert or replace a value, then persist.
    pub async fn insert(&self, key: String, value: V) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(key, value);
        self.write_file(&map).await
    }

    /// Remove a key and persist when it existed; returns whether it existed.
    /// An `Err` means the key was removed but the file could not be rewritten.
    pub async fn remove(&self, key: &str) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        if map.remove(key).is_none() {
            return Ok(false);
        }
        self.write_file(&map).await?;
        Ok(true)
    }
}
