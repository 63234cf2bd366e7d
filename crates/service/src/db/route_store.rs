use async_trait::async_trait;
use models::{json_route, normalize_route, ContentRecord};
use sea_orm::DatabaseConnection;
use tracing::{error, warn};

use crate::errors::ServiceError;
use crate::store::RouteStore;

/// SeaORM-backed route store over the `json_routes` table.
///
/// Connection and query failures are logged here and returned as `Err`;
/// they never panic or abort the request.
pub struct SeaOrmRouteStore {
    pub db: DatabaseConnection,
}

impl SeaOrmRouteStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl RouteStore for SeaOrmRouteStore {
    async fn list(&self) -> Result<Vec<ContentRecord>, ServiceError> {
        let rows = json_route::list(&self.db).await.map_err(|e| {
            error!(event = "db_list_failed", error = %e, "listing routes from database failed");
            ServiceError::from(e)
        })?;
        let records = rows
            .iter()
            .filter_map(|row| match row.to_record() {
                Ok(rec) => Some(rec),
                Err(e) => {
                    warn!(event = "db_row_corrupt", route = %row.route, error = %e, "skipping undecodable route row");
                    None
                }
            })
            .collect();
        Ok(records)
    }

    async fn get(&self, route: &str) -> Result<Option<ContentRecord>, ServiceError> {
        let route = normalize_route(route);
        let row = json_route::find(&self.db, &route).await.map_err(|e| {
            error!(event = "db_get_failed", %route, error = %e, "reading route from database failed");
            ServiceError::from(e)
        })?;
        match row {
            None => Ok(None),
            Some(row) => row.to_record().map(Some).map_err(|e| {
                warn!(event = "db_row_corrupt", %route, error = %e, "stored route content is undecodable");
                ServiceError::from(e)
            }),
        }
    }

    async fn put(&self, record: ContentRecord) -> Result<(), ServiceError> {
        let route = normalize_route(&record.route);
        json_route::upsert(&self.db, &route, &record.content).await.map_err(|e| {
            error!(event = "db_upsert_failed", %route, kind = %record.kind(), error = %e, "writing route to database failed");
            ServiceError::from(e)
        })
    }

    async fn delete(&self, route: &str) -> Result<bool, ServiceError> {
        let route = normalize_route(route);
        json_route::delete(&self.db, &route).await.map_err(|e| {
            error!(event = "db_delete_failed", %route, error = %e, "deleting route from database failed");
            ServiceError::from(e)
        })
    }
}
