use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorResponseDoc { pub error: String }

/// One stored route as listed by `GET /api/routes`.
#[derive(ToSchema, serde::Serialize)]
pub struct RouteEntryDoc {
    pub route: String,
    #[serde(rename = "type")]
    #[schema(example = "json")]
    pub kind: String,
    #[schema(value_type = Object)]
    pub content: serde_json::Value,
}

#[derive(ToSchema, serde::Deserialize)]
pub struct UpsertRouteRequestDoc {
    #[schema(example = "users/1")]
    pub route: String,
    /// JSON value (or JSON text) for `json`, raw markup string for `html`.
    #[schema(value_type = Object)]
    pub content: serde_json::Value,
    #[serde(rename = "type")]
    #[schema(example = "json")]
    pub kind: Option<String>,
}

#[derive(ToSchema, serde::Serialize)]
pub struct UpsertRouteResponseDoc {
    pub message: String,
    pub route: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[schema(example = "file")]
    pub storage: String,
}

#[derive(ToSchema)]
pub struct DeleteRouteResponseDoc {
    pub message: String,
    #[schema(example = "database")]
    pub storage: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::content::list_routes,
        crate::routes::content::upsert_route,
        crate::routes::content::delete_route,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponseDoc,
            RouteEntryDoc,
            UpsertRouteRequestDoc,
            UpsertRouteResponseDoc,
            DeleteRouteResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "routes")
    )
)]
pub struct ApiDoc;
