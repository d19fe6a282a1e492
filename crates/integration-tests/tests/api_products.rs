//! Product API: public listing, token-guarded writes.

use axum::http::{Method, StatusCode, header::WWW_AUTHENTICATE};
use serde_json::json;

use online_store_integration_tests::TestApp;

#[tokio::test]
async fn test_list_is_public() {
    let mut app = TestApp::new();
    app.seed_product("TV", "1200").await;

    let response = app.api(Method::GET, "/api/products", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let products = response.json();
    assert_eq!(products.as_array().unwrap().len(), 1);
    assert_eq!(products[0]["name"], "TV");
    assert_eq!(products[0]["price"], "1200.00");
}

#[tokio::test]
async fn test_create_requires_token() {
    let mut app = TestApp::new();

    let response = app
        .api(
            Method::POST,
            "/api/products",
            Some(json!({ "name": "TV", "price": 1200 })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers[WWW_AUTHENTICATE], "Token");
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn test_negative_price_is_rejected_and_nothing_persisted() {
    let mut app = TestApp::new();
    let token = app.signup("alice", "s3cret").await;

    let response = app
        .api(
            Method::POST,
            "/api/products",
            Some(json!({ "name": "TV", "price": -5 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Price must be greater than zero.");

    let list = app.api(Method::GET, "/api/products", None, None).await;
    assert_eq!(list.json(), json!([]));
}

#[tokio::test]
async fn test_product_lifecycle() {
    let mut app = TestApp::new();
    let token = app.signup("alice", "s3cret").await;

    let created = app
        .api(
            Method::POST,
            "/api/products",
            Some(json!({ "name": "TV", "price": 1200 })),
            Some(&token),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let product = created.json();
    assert_eq!(product["name"], "TV");
    assert_eq!(product["price"], "1200.00");
    let uri = format!("/api/products/{}", product["id"]);

    let fetched = app.api(Method::GET, &uri, None, Some(&token)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json()["name"], "TV");

    let updated = app
        .api(
            Method::PATCH,
            &uri,
            Some(json!({ "price": "999.99" })),
            Some(&token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["name"], "TV");
    assert_eq!(updated.json()["price"], "999.99");

    let deleted = app.api(Method::DELETE, &uri, None, Some(&token)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app.api(Method::GET, &uri, None, Some(&token)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.json(), json!({ "error": "Not found." }));
}

#[tokio::test]
async fn test_trailing_slash_is_the_same_endpoint() {
    let mut app = TestApp::new();
    app.seed_product("Chromecast", "49.99").await;

    let response = app.api(Method::GET, "/api/products/", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()[0]["name"], "Chromecast");
}

#[tokio::test]
async fn test_non_numeric_id_is_not_found() {
    let mut app = TestApp::new();
    let token = app.signup("alice", "s3cret").await;

    let response = app
        .api(Method::GET, "/api/products/tv", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
