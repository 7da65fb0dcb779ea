//! List endpoint behavior: parameter translation, pagination envelope,
//! search, ordering, and the permissive fallbacks for malformed input.

mod common;

use coindiary_api::query::QueryOptions;
use common::{get, owner_token, test_app};

#[tokio::test]
async fn total_count_reflects_the_full_set_not_the_page() {
    let app = test_app().await;
    let token = owner_token();

    let (status, body) = get(&app, "/api/crypto-markets?limit=2", &token).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["totalCount"], 5);
}

#[tokio::test]
async fn default_order_is_id_ascending() {
    let app = test_app().await;
    let token = owner_token();

    let (_, body) = get(&app, "/api/crypto-markets", &token).await;
    let ids: Vec<&str> =
        body["data"].as_array().unwrap().iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["m-1", "m-2", "m-3", "m-4", "m-5"]);
}

#[tokio::test]
async fn leftover_params_become_exact_equality_filters() {
    let app = test_app().await;
    let token = owner_token();

    // Exact match only; "Bitcoin Cash" must not qualify.
    let (status, body) = get(&app, "/api/crypto-markets?name=Bitcoin", &token).await;
    assert_eq!(status, 200);
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["data"][0]["symbol"], "BTC");
}

#[tokio::test]
async fn search_term_matches_substrings_across_the_named_keys() {
    let app = test_app().await;
    let token = owner_token();

    let uri = "/api/crypto-markets?searchTerm=bit&searchTermKeys=%5B%22name%22%5D";
    let (status, body) = get(&app, uri, &token).await;
    assert_eq!(status, 200);
    assert_eq!(body["totalCount"], 2);
    for row in body["data"].as_array().unwrap() {
        assert!(row["name"].as_str().unwrap().to_lowercase().contains("bit"));
    }
}

#[tokio::test]
async fn search_term_without_keys_is_ignored() {
    let app = test_app().await;
    let token = owner_token();

    let (status, body) = get(&app, "/api/crypto-markets?searchTerm=bit", &token).await;
    assert_eq!(status, 200);
    assert_eq!(body["totalCount"], 5);
}

#[tokio::test]
async fn numeric_columns_sort_numerically() {
    let app = test_app().await;
    let token = owner_token();

    let uri = "/api/crypto-markets?order=%5B%7B%22id%22%3A%22current_price%22%2C%22desc%22%3Atrue%7D%5D";
    let (_, body) = get(&app, uri, &token).await;
    let symbols: Vec<&str> =
        body["data"].as_array().unwrap().iter().map(|r| r["symbol"].as_str().unwrap()).collect();
    assert_eq!(symbols, vec!["BTC", "ETH", "BCH", "SOL", "ADA"]);
}

#[tokio::test]
async fn timestamp_columns_sort_chronologically() {
    let app = test_app().await;
    let token = owner_token();

    let uri = "/api/crypto-markets?order=%5B%7B%22id%22%3A%22created_at%22%2C%22desc%22%3Afalse%7D%5D";
    let (_, body) = get(&app, uri, &token).await;
    assert_eq!(body["data"][0]["id"], "m-5");
    assert_eq!(body["data"][4]["id"], "m-3");
}

#[tokio::test]
async fn ui_built_requests_default_to_newest_first() {
    let app = test_app().await;
    let token = owner_token();

    // The exact query string a list view issues before any interaction.
    let qs = serde_urlencoded::to_string(QueryOptions::default().to_query_pairs()).unwrap();
    let (status, body) = get(&app, &format!("/api/crypto-markets?{}", qs), &token).await;
    assert_eq!(status, 200);
    let ids: Vec<&str> =
        body["data"].as_array().unwrap().iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["m-3", "m-1", "m-2", "m-4", "m-5"]);
}

#[tokio::test]
async fn malformed_paging_params_fall_back_to_defaults() {
    let app = test_app().await;
    let token = owner_token();

    // limit=abc -> 20, offset=abc -> 0: the whole seeded set comes back.
    let (status, body) = get(&app, "/api/crypto-markets?limit=abc&offset=abc", &token).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["totalCount"], 5);
}

#[tokio::test]
async fn malformed_order_is_dropped_not_rejected() {
    let app = test_app().await;
    let token = owner_token();

    let (status, body) = get(&app, "/api/crypto-markets?order=%7Bnot-json", &token).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"][0]["id"], "m-1");
}

#[tokio::test]
async fn offset_pages_through_the_filtered_set() {
    let app = test_app().await;
    let token = owner_token();

    let (_, body) = get(&app, "/api/crypto-markets?limit=2&offset=4", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"], "m-5");
    assert_eq!(body["totalCount"], 5);
}

#[tokio::test]
async fn injection_shaped_filter_names_are_rejected() {
    let app = test_app().await;
    let token = owner_token();

    let (status, body) =
        get(&app, "/api/crypto-markets?name%3B%20DROP%20TABLE%20t=x", &token).await;
    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().contains("column"));
}

#[tokio::test]
async fn unknown_entity_route_is_a_404() {
    let app = test_app().await;
    let token = owner_token();

    let (status, body) = get(&app, "/api/organizations", &token).await;
    assert_eq!(status, 404);
    assert!(body["message"].as_str().unwrap().contains("organizations"));
}
