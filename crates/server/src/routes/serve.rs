use axum::{
    extract::State,
    http::Uri,
    response::{Html, IntoResponse, Response},
    Json,
};
use models::RouteContent;

use crate::errors::ApiError;
use crate::routes::ServerState;

/// Serve a stored route: JSON payloads as `application/json`, HTML verbatim as `text/html`.
pub async fn serve_route(State(state): State<ServerState>, uri: Uri) -> Response {
    match state.registry.resolve(uri.path()).await {
        Some(RouteContent::Json(value)) => Json(value).into_response(),
        Some(RouteContent::Html(html)) => Html(html).into_response(),
        None => ApiError::route_not_found().into_response(),
    }
}
