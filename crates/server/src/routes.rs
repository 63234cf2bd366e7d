use std::sync::Arc;

use axum::{
    routing::{delete, get, MethodRouter},
    Json, Router,
};
use common::types::Health;
use service::RouteRegistry;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use crate::errors::handle_panic;
use crate::openapi::ApiDoc;

pub mod content;
pub mod serve;

#[derive(Clone)]
pub struct ServerState {
    pub registry: Arc<RouteRegistry>,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router.
///
/// Order of precedence: admin API and health, then files under
/// `public_dir`, then stored routes for any other GET.
pub fn build_router(state: ServerState, public_dir: &str, cors: CorsLayer) -> Router {
    // Stored routes answer whatever GET the static directory cannot
    let dynamic: MethodRouter = get(serve::serve_route).with_state(state.clone());
    let static_dir = ServeDir::new(public_dir).fallback(dynamic);

    let api = Router::new()
        .route("/api/routes", get(content::list_routes).post(content::upsert_route))
        // wildcard also covers stored routes under /api/routes/
        .route("/api/routes/*route", delete(content::delete_route).get(serve::serve_route))
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state);

    api.fallback_service(static_dir)
        // handler panics render as 500 {"error"}
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        // request tracing: span per request, one event on request and on response
        .layer(
            TraceLayer::new_for_http()
                // span carries method and uri, no headers
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                // request start
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and transport errors
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use service::{file::route_store::FileRouteStore, Backend};
    use tower::ServiceExt;

    async fn app() -> (Router, std::path::PathBuf) {
        let tmp = std::env::temp_dir().join(format!("server_routes_{}.json", uuid::Uuid::new_v4()));
        let file = Arc::new(FileRouteStore::open(&tmp).await);
        let state = ServerState { registry: Arc::new(RouteRegistry::new(file, Backend::File)) };
        (build_router(state, "/nonexistent-public-dir", CorsLayer::very_permissive()), tmp)
    }

    #[tokio::test]
    async fn health_takes_precedence_over_stored_routes() {
        let (app, tmp) = app().await;
        let req = Request::post("/api/routes")
            .header("content-type", "application/json")
            .body(Body::from(json!({"route": "/health", "content": {"shadowed": true}}).to_string()))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app.oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"status": "ok"}));
        let _ = std::fs::remove_file(tmp);
    }

    #[tokio::test]
    async fn missing_public_dir_falls_through_to_not_found() {
        let (app, _) = app().await;
        let res = app.oneshot(Request::get("/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stored_route_under_admin_prefix_is_served() {
        let (app, tmp) = app().await;
        let req = Request::post("/api/routes")
            .header("content-type", "application/json")
            .body(Body::from(json!({"route": "api/routes/doc", "content": {"doc": 1}}).to_string()))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app.clone().oneshot(Request::get("/api/routes/doc").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({"doc": 1}));

        let res = app.oneshot(Request::get("/api/routes/missing").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({"error": "Route not found"}));
        let _ = std::fs::remove_file(tmp);
    }

    #[tokio::test]
    async fn form_encoded_upsert_is_accepted() {
        let (app, tmp) = app().await;
        let req = Request::post("/api/routes")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("route=%2Fform&type=html&content=%3Cp%3Ehi%3C%2Fp%3E"))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app.oneshot(Request::get("/form").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<p>hi</p>");
        let _ = std::fs::remove_file(tmp);
    }
}
