//! Static pages, product pages and operational endpoints.

use axum::http::StatusCode;

use online_store_integration_tests::TestApp;
use online_store_storefront::db::ProductRepository as _;

#[tokio::test]
async fn test_home_and_about() {
    let mut app = TestApp::new();

    let home = app.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.text().contains("Online Store"));

    let about = app.get("/about").await;
    assert_eq!(about.status, StatusCode::OK);
    let html = about.text();
    assert!(html.contains("About us"));
    assert!(html.contains("Developed by: J.D"));
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let mut app = TestApp::new();

    let response = app.get("/").await;

    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_health() {
    let mut app = TestApp::new();

    assert_eq!(app.get("/health").await.text(), "ok");
    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_product_listing_and_detail() {
    let mut app = TestApp::new();
    let tv = app.seed_product("TV", "1200").await;
    app.seed_product("Chromecast", "49.99").await;

    let listing = app.get("/products").await;
    assert_eq!(listing.status, StatusCode::OK);
    let html = listing.text();
    assert!(html.contains("TV"));
    assert!(html.contains("Chromecast"));
    assert!(html.contains("49.99"));

    let detail = app.get(&format!("/products/{}", tv.id)).await;
    assert_eq!(detail.status, StatusCode::OK);
    let html = detail.text();
    assert!(html.contains("TV - Product information"));
    assert!(html.contains("1200.00"));
}

#[tokio::test]
async fn test_invalid_product_id_redirects_home() {
    let mut app = TestApp::new();

    for uri in ["/products/0", "/products/-1", "/products/tv"] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(response.location(), Some("/"));
    }
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let mut app = TestApp::new();

    let response = app.get("/products/42").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_product_form() {
    let mut app = TestApp::new();

    let form = app.get("/products/create").await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.text().contains("action=\"/products/create\""));

    let created = app.post_form("/products/create", "name=TV&price=1200").await;
    assert_eq!(created.status, StatusCode::OK);
    assert!(created.text().contains("TV"));

    let products = app.state().products().list().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price.to_string(), "1200.00");
}

#[tokio::test]
async fn test_create_product_form_errors() {
    let mut app = TestApp::new();

    let response = app.post_form("/products/create", "name=&price=-5").await;

    assert_eq!(response.status, StatusCode::OK);
    let html = response.text();
    assert!(html.contains("This field may not be blank."));
    assert!(html.contains("Price must be greater than zero."));
    assert!(html.contains("value=\"-5\""));
    assert!(app.state().products().list().await.unwrap().is_empty());
}
