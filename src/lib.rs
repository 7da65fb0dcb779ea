//! coindiary API: a multi-tenant CRUD service for crypto markets, news,
//! portfolios and watchlists, plus the client SDK that drives its list
//! endpoints.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod auth;
pub mod client;
pub mod config;
pub mod database;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notify;
pub mod policy;
pub mod query;
pub mod validation;

use database::Engine;
use notify::Notifier;
use policy::AccessPolicy;

/// Shared handler state. Engine and policy are trait objects so tests can
/// swap the Postgres engine for the in-memory one.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn Engine>,
    pub policy: Arc<dyn AccessPolicy>,
    pub notifier: Notifier,
}

pub fn app(state: AppState) -> Router {
    let cfg = config::config();
    let api = Router::new()
        .route(
            "/:entity",
            get(handlers::collection::get)
                .post(handlers::collection::post)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/:entity/:id",
            get(handlers::record::get)
                .put(handlers::record::put)
                .delete(handlers::record::delete)
                .fallback(handlers::method_not_allowed),
        )
        .layer(axum::middleware::from_fn(middleware::session_middleware));

    let mut router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Session-protected entity API
        .nest("/api", api)
        .layer(cors_layer(&cfg.security.cors_origins));

    if cfg.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

/// CORS layer from the configured origin allow-list; `*` means any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new().allow_origin(AllowOrigin::list(allowed)).allow_methods(Any).allow_headers(Any)
}
