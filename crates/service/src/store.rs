use async_trait::async_trait;
use models::ContentRecord;
use serde::Serialize;

use crate::errors::ServiceError;

/// Durable keyed storage of content records.
///
/// An `Err` from any method means the operation did not complete; callers
/// treat it as "backend unavailable" rather than as a fatal error.
#[async_trait]
pub trait RouteStore: Send + Sync {
    async fn list(&self) -> Result<Vec<ContentRecord>, ServiceError>;
    async fn get(&self, route: &str) -> Result<Option<ContentRecord>, ServiceError>;
    async fn put(&self, record: ContentRecord) -> Result<(), ServiceError>;
    async fn delete(&self, route: &str) -> Result<bool, ServiceError>;
}

/// Which backend actually served a write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Database,
    File,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Database => "database",
            StorageKind::File => "file",
        }
    }
}
