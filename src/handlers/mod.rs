pub mod collection;
pub mod record;

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Json};
use serde_json::{json, Value};

use crate::entities::{Entity, ALL_ENTITIES};
use crate::error::ApiError;
use crate::AppState;

pub(crate) fn resolve_entity(slug: &str) -> Result<Entity, ApiError> {
    Entity::from_route(slug).ok_or_else(|| ApiError::not_found(format!("Unknown entity route: {}", slug)))
}

/// Per-route fallback for HTTP verbs the collection and record endpoints do
/// not support.
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(&method)
}

pub async fn root() -> Json<Value> {
    let routes: Vec<String> = ALL_ENTITIES.iter().map(|e| format!("/api/{}", e.route())).collect();
    Json(json!({
        "name": "coindiary API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Multi-tenant CRUD API for crypto markets, news, portfolios and watchlists",
        "entities": routes,
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    match state.engine.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "engine": "ok" })),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "timestamp": now, "engine_error": err.to_string() })),
        ),
    }
}
