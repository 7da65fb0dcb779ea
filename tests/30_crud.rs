//! Record lifecycle and access control: create/read/update/delete, the
//! validation surface, and the auth failure modes.

mod common;

use axum::http::Method;
use serde_json::json;

use common::{get, owner_token, request, test_app, token_for, MARKET_USER};

#[tokio::test]
async fn create_read_update_delete_round_trip() {
    let app = test_app().await;
    let token = owner_token();

    let body = json!({
        "name": "Polkadot",
        "symbol": "DOT",
        "current_price": 7,
        "market_cap": 9000,
        "volume": 120,
        "user_id": MARKET_USER,
    });
    let (status, created) =
        request(&app, Method::POST, "/api/crypto-markets", Some(&token), Some(body)).await;
    assert_eq!(status, 200);
    let id = created["id"].as_str().expect("created id").to_string();
    assert_eq!(created["symbol"], "DOT");

    let (status, fetched) = get(&app, &format!("/api/crypto-markets/{}", id), &token).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["name"], "Polkadot");

    let update = json!({
        "name": "Polkadot",
        "symbol": "DOT",
        "current_price": 8,
        "market_cap": 9500,
        "volume": 130,
        "user_id": MARKET_USER,
    });
    let (status, updated) = request(
        &app,
        Method::PUT,
        &format!("/api/crypto-markets/{}", id),
        Some(&token),
        Some(update),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(updated["current_price"], 8);

    let (status, deleted) =
        request(&app, Method::DELETE, &format!("/api/crypto-markets/{}", id), Some(&token), None)
            .await;
    assert_eq!(status, 200);
    assert_eq!(deleted["id"], id.as_str());

    let (status, _) = get(&app, &format!("/api/crypto-markets/{}", id), &token).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn create_rejects_missing_required_fields() {
    let app = test_app().await;
    let token = owner_token();

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/crypto-markets",
        Some(&token),
        Some(json!({ "name": "Tezos" })),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["field_errors"]["symbol"], "This field is required");
}

#[tokio::test]
async fn create_rejects_wrongly_typed_fields() {
    let app = test_app().await;
    let token = owner_token();

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/crypto-markets",
        Some(&token),
        Some(json!({
            "name": "Tezos",
            "symbol": "XTZ",
            "current_price": "not-a-number",
            "market_cap": 1,
            "volume": 1,
            "user_id": MARKET_USER,
        })),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["field_errors"]["current_price"], "Expected an integer value");
}

#[tokio::test]
async fn nested_collections_are_stripped_from_create_payloads() {
    let app = test_app().await;
    let token = owner_token();

    let (status, created) = request(
        &app,
        Method::POST,
        "/api/crypto-markets",
        Some(&token),
        Some(json!({
            "name": "Tezos",
            "symbol": "XTZ",
            "current_price": 1,
            "market_cap": 1,
            "volume": 1,
            "user_id": MARKET_USER,
            "crypto_portfolio": [{ "amount": 10 }],
        })),
    )
    .await;
    assert_eq!(status, 200);
    assert!(created.get("crypto_portfolio").is_none());
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let app = test_app().await;

    let (status, body) = request(&app, Method::GET, "/api/crypto-markets", None, None).await;
    assert_eq!(status, 401);
    assert!(body["message"].as_str().unwrap().contains("Authorization"));
}

#[tokio::test]
async fn unknown_roles_get_the_bare_forbidden_body() {
    let app = test_app().await;
    let token = token_for(&["Guest"]);

    let (status, body) = request(&app, Method::GET, "/api/crypto-markets", Some(&token), None).await;
    assert_eq!(status, 403);
    assert_eq!(body, json!({ "message": "Forbidden" }));
}

#[tokio::test]
async fn missing_record_is_a_404_with_table_context() {
    let app = test_app().await;
    let token = owner_token();

    let (status, body) = get(&app, "/api/crypto-markets/no-such-id", &token).await;
    assert_eq!(status, 404);
    assert!(body["message"].as_str().unwrap().contains("crypto_market"));
}

#[tokio::test]
async fn unsupported_verbs_get_a_405_naming_the_method() {
    let app = test_app().await;
    let token = owner_token();

    let (status, body) =
        request(&app, Method::PATCH, "/api/crypto-markets/m-1", Some(&token), None).await;
    assert_eq!(status, 405);
    assert_eq!(body["message"], "Method PATCH not allowed");
}

#[tokio::test]
async fn get_by_id_hydrates_requested_parent_relations() {
    let app = test_app().await;
    let token = owner_token();

    let uri = "/api/crypto-portfolios/p-1?relations=%5B%22crypto_market%22%2C%22user%22%5D";
    let (status, body) = get(&app, uri, &token).await;
    assert_eq!(status, 200);
    assert_eq!(body["crypto_market"]["symbol"], "BTC");
    assert_eq!(body["user"]["email"], "analyst@coindiary.test");
}

#[tokio::test]
async fn cors_allows_the_configured_origin() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = test_app().await;
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000"),
    );
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = test_app().await;

    let (status, body) = request(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
}
