use axum::{
    extract::{FromRequest, Path, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use models::ContentRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service::StorageKind;
use tracing::info;

use crate::errors::ApiError;
use crate::routes::ServerState;

/// Admin request body. `json` is accepted in place of `content` and `type`
/// defaults to `json`, matching the first release's `{route, json}` body.
#[derive(Debug, Deserialize)]
pub struct UpsertRouteInput {
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default, alias = "json")]
    pub content: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpsertRouteOutput {
    pub message: String,
    pub route: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub storage: StorageKind,
}

#[derive(Debug, Serialize)]
pub struct DeleteRouteOutput {
    pub message: String,
    pub storage: StorageKind,
}

#[utoipa::path(get, path = "/api/routes", tag = "routes", responses((status = 200, description = "All stored routes", body = [crate::openapi::RouteEntryDoc])))]
pub async fn list_routes(State(state): State<ServerState>) -> Json<Vec<ContentRecord>> {
    let routes = state.registry.list_all().await;
    info!(count = routes.len(), "list routes");
    Json(routes)
}

/// Decode the upsert body from JSON or from an HTML form post.
/// Malformed bodies are a 400 rather than axum's default rejection status.
async fn read_upsert_input(req: Request) -> Result<UpsertRouteInput, ApiError> {
    let is_form = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    if is_form {
        let Form(input) = Form::<UpsertRouteInput>::from_request(req, &())
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(input)
    } else {
        let Json(input) = Json::<UpsertRouteInput>::from_request(req, &())
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(input)
    }
}

#[utoipa::path(
    post, path = "/api/routes", tag = "routes",
    request_body = crate::openapi::UpsertRouteRequestDoc,
    responses(
        (status = 200, description = "Stored", body = crate::openapi::UpsertRouteResponseDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorResponseDoc)
    )
)]
pub async fn upsert_route(
    State(state): State<ServerState>,
    req: Request,
) -> Result<Json<UpsertRouteOutput>, ApiError> {
    let input = read_upsert_input(req).await?;
    let route = input.route.unwrap_or_default();
    let kind = input.kind.unwrap_or_else(|| "json".to_string());
    let content = input.content.unwrap_or(Value::Null);

    let stored = state.registry.upsert(&route, &kind, content).await?;
    Ok(Json(UpsertRouteOutput {
        message: "Route added successfully".into(),
        route: stored.route,
        kind: stored.kind.as_str().to_string(),
        storage: stored.storage,
    }))
}

#[utoipa::path(
    delete, path = "/api/routes/{route}", tag = "routes",
    params(("route" = String, Path, description = "Stored route without its leading slash; may contain further slashes")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::DeleteRouteResponseDoc),
        (status = 404, description = "Route not found", body = crate::openapi::ErrorResponseDoc)
    )
)]
pub async fn delete_route(
    State(state): State<ServerState>,
    Path(route): Path<String>,
) -> Result<Json<DeleteRouteOutput>, ApiError> {
    let storage = state.registry.remove(&format!("/{route}")).await?;
    Ok(Json(DeleteRouteOutput { message: "Route deleted successfully".into(), storage }))
}
