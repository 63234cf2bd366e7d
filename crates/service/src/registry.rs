//! Route registry: the single CRUD surface the HTTP layer talks to.
//!
//! The file store is always present. When a database is configured it is
//! the primary backend and the file store is only a local safety net for
//! operations the database could not complete; the two are never
//! synchronised with each other.

use std::str::FromStr;
use std::sync::Arc;

use models::{normalize_route, ContentKind, ContentRecord, RouteContent};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::file::route_store::FileRouteStore;
use crate::store::{RouteStore, StorageKind};

/// Primary backend, resolved once at startup.
pub enum Backend {
    File,
    Database(Arc<dyn RouteStore>),
}

/// Result of a successful upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted {
    pub route: String,
    pub kind: ContentKind,
    pub storage: StorageKind,
}

pub struct RouteRegistry {
    file: Arc<FileRouteStore>,
    backend: Backend,
}

impl RouteRegistry {
    pub fn new(file: Arc<FileRouteStore>, backend: Backend) -> Self {
        Self { file, backend }
    }

    /// Backend that serves writes while it is healthy.
    pub fn storage(&self) -> StorageKind {
        match self.backend {
            Backend::File => StorageKind::File,
            Backend::Database(_) => StorageKind::Database,
        }
    }

    pub async fn list_all(&self) -> Vec<ContentRecord> {
        if let Backend::Database(db) = &self.backend {
            match db.list().await {
                Ok(records) => return records,
                Err(e) => warn!(event = "list_fallback", error = %e, "database unavailable; listing local routes"),
            }
        }
        self.file.list().await
    }

    /// Validate and store a route. Validation happens before any storage call.
    #[instrument(skip(self, content))]
    pub async fn upsert(&self, route: &str, kind: &str, content: Value) -> Result<Upserted, ServiceError> {
        if route.trim().is_empty() || is_missing(&content) {
            return Err(ServiceError::Validation("Route and content are required".into()));
        }
        let kind = ContentKind::from_str(kind)?;
        let content = RouteContent::from_input(kind, content)?;
        let record = ContentRecord::new(route, content);
        let route = record.route.clone();

        let storage = match &self.backend {
            Backend::Database(db) => match db.put(record.clone()).await {
                Ok(()) => StorageKind::Database,
                Err(e) => {
                    warn!(event = "upsert_fallback", %route, error = %e, "database write failed; storing route locally");
                    self.file.put(record).await;
                    StorageKind::File
                }
            },
            Backend::File => {
                self.file.put(record).await;
                StorageKind::File
            }
        };
        info!(event = "route_upserted", %route, kind = %kind, storage = storage.as_str(), "route stored");
        Ok(Upserted { route, kind, storage })
    }

    /// Delete a route from whichever backend holds it.
    pub async fn remove(&self, route: &str) -> Result<StorageKind, ServiceError> {
        let route = normalize_route(route);
        if let Backend::Database(db) = &self.backend {
            match db.delete(&route).await {
                Ok(true) => {
                    info!(event = "route_deleted", %route, storage = "database", "route deleted");
                    return Ok(StorageKind::Database);
                }
                Ok(false) => {}
                Err(e) => warn!(event = "delete_fallback", %route, error = %e, "database delete failed; trying local routes"),
            }
        }
        if self.file.delete(&route).await {
            info!(event = "route_deleted", %route, storage = "file", "route deleted");
            Ok(StorageKind::File)
        } else {
            Err(ServiceError::not_found("Route"))
        }
    }

    /// Look up the content served at `route`.
    pub async fn resolve(&self, route: &str) -> Option<RouteContent> {
        let route = normalize_route(route);
        if let Backend::Database(db) = &self.backend {
            match db.get(&route).await {
                Ok(Some(rec)) => return Some(rec.content),
                Ok(None) => {}
                Err(e) => warn!(event = "resolve_fallback", %route, error = %e, "database read failed; trying local routes"),
            }
        }
        self.file.get(&route).await.map(|rec| rec.content)
    }
}

/// `null` and the empty string count as absent content.
fn is_missing(content: &Value) -> bool {
    match content {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
