//! Shared helpers for the integration suites: an in-process router backed
//! by the in-memory engine, token minting, and request plumbing.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use coindiary_api::auth::{generate_token, Claims};
use coindiary_api::database::MemoryEngine;
use coindiary_api::notify::Notifier;
use coindiary_api::policy::RoleAccessPolicy;
use coindiary_api::{app, AppState};

pub const MARKET_USER: &str = "5f2b7a50-0000-4000-8000-000000000001";

/// Router over a memory engine seeded with five markets, one user row for
/// relation hydration, and one portfolio entry. Solana is the newest row
/// despite its middle id, so creation order and id order disagree.
pub async fn test_app() -> Router {
    let engine = MemoryEngine::new();

    engine
        .seed(
            "user",
            vec![json!({
                "id": MARKET_USER,
                "email": "analyst@coindiary.test",
                "created_at": "2024-01-01T00:00:00Z",
            })],
        )
        .await;

    engine
        .seed(
            "crypto_market",
            vec![
                market("m-1", "Bitcoin", "BTC", 43000, "2024-01-05T10:00:00Z"),
                market("m-2", "Ethereum", "ETH", 2300, "2024-01-04T10:00:00Z"),
                market("m-3", "Solana", "SOL", 98, "2024-01-06T10:00:00Z"),
                market("m-4", "Cardano", "ADA", 1, "2024-01-02T10:00:00Z"),
                market("m-5", "Bitcoin Cash", "BCH", 240, "2024-01-01T10:00:00Z"),
            ],
        )
        .await;

    engine
        .seed(
            "crypto_portfolio",
            vec![json!({
                "id": "p-1",
                "amount": 2,
                "purchase_price": 40000,
                "purchase_date": "2024-01-10T00:00:00Z",
                "crypto_id": "m-1",
                "user_id": MARKET_USER,
                "created_at": "2024-01-10T00:00:00Z",
            })],
        )
        .await;

    let state = AppState {
        engine: Arc::new(engine),
        policy: Arc::new(RoleAccessPolicy::from_config()),
        notifier: Notifier::disabled(),
    };
    app(state)
}

fn market(id: &str, name: &str, symbol: &str, price: i64, created_at: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "symbol": symbol,
        "current_price": price,
        "market_cap": price * 1000,
        "volume": price * 10,
        "user_id": MARKET_USER,
        "created_at": created_at,
        "updated_at": created_at,
    })
}

/// Mint a token for the given roles with the dev-profile secret.
pub fn token_for(roles: &[&str]) -> String {
    let claims = Claims::new(
        Uuid::parse_str(MARKET_USER).unwrap(),
        "coindiary",
        roles.iter().map(|r| r.to_string()).collect(),
    );
    generate_token(&claims).expect("token")
}

pub fn owner_token() -> String {
    token_for(&["Owner"])
}

pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    request(app, Method::GET, uri, Some(token), None).await
}
