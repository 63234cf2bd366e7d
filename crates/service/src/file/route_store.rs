use std::path::PathBuf;

use async_trait::async_trait;
use models::{legacy, normalize_route, ContentRecord, RouteContent};
use tracing::{error, info, warn};

use crate::errors::ServiceError;
use crate::storage::json_map_store::{read_document, JsonMapStore};
use crate::store::RouteStore;

/// Route records held in memory and mirrored to a JSON file.
///
/// Hydrated once by [`FileRouteStore::open`]; after that the file is only
/// ever written. Write failures are logged and never undo the in-memory change.
pub struct FileRouteStore {
    store: JsonMapStore<RouteContent>,
}

impl FileRouteStore {
    /// Load `path`, migrate whatever it holds to the current record shape and
    /// write the migrated set back. Missing or unreadable files start an
    /// empty store and are left untouched until the first write.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let (entries, migrated) = match read_document(&path).await {
            Ok(Some(doc)) => (legacy::migrate_document(doc), true),
            Ok(None) => {
                info!(event = "routes_file_missing", path = %path.display(), "no routes file yet; starting empty");
                (Default::default(), false)
            }
            Err(e) => {
                warn!(event = "routes_file_unreadable", path = %path.display(), error = %e, "could not load existing routes; starting empty");
                (Default::default(), false)
            }
        };
        let store = JsonMapStore::with_entries(path, entries);
        if migrated {
            if let Err(e) = store.save().await {
                error!(event = "routes_file_write_failed", path = %store.path().display(), error = %e, "could not persist migrated routes");
            }
        }
        let count = store.len().await;
        info!(event = "routes_loaded", path = %store.path().display(), count, "file route store ready");
        Self { store }
    }

    pub async fn list(&self) -> Vec<ContentRecord> {
        self.store
            .list()
            .await
            .into_iter()
            .map(|(route, content)| ContentRecord { route, content })
            .collect()
    }

    pub async fn get(&self, route: &str) -> Option<ContentRecord> {
        let route = normalize_route(route);
        self.store.get(&route).await.map(|content| ContentRecord { route, content })
    }

    pub async fn put(&self, record: ContentRecord) {
        let route = normalize_route(&record.route);
        if let Err(e) = self.store.insert(route.clone(), record.content).await {
            error!(event = "routes_file_write_failed", %route, error = %e, "route kept in memory but not persisted");
        }
    }

    /// Remove `route`; returns whether it existed.
    pub async fn delete(&self, route: &str) -> bool {
        let route = normalize_route(route);
        match self.store.remove(&route).await {
            Ok(existed) => existed,
            Err(e) => {
                error!(event = "routes_file_write_failed", %route, error = %e, "route removed from memory but file not rewritten");
                true
            }
        }
    }
}

#[async_trait]
impl RouteStore for FileRouteStore {
    async fn list(&self) -> Result<Vec<ContentRecord>, ServiceError> { Ok(self.list().await) }
    async fn get(&self, route: &str) -> Result<Option<ContentRecord>, ServiceError> { Ok(self.get(route).await) }
    async fn put(&self, record: ContentRecord) -> Result<(), ServiceError> { self.put(record).await; Ok(()) }
    async fn delete(&self, route: &str) -> Result<bool, ServiceError> { Ok(self.delete(route).await) }
}
