//! Integration tests for the online store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p online-store-integration-tests
//! ```
//!
//! Tests drive the complete storefront router in-process: in-memory
//! repositories, a `MemoryStore` session backend and a temporary media root.
//! No database or network listener is needed.
//!
//! # Test Categories
//!
//! - `api_auth` - Signup and login
//! - `api_products` - Product API
//! - `api_todos` - Owner-scoped todo API
//! - `cart_session` - Session cart pages
//! - `images` - Image upload, with injected and handler-built storage
//! - `pages` - Static and product pages

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_http::normalize_path::NormalizePath;
use tower_sessions::MemoryStore;

use online_store_core::Price;
use online_store_storefront::config::StorefrontConfig;
use online_store_storefront::db::{ProductRepository as _, Repositories};
use online_store_storefront::middleware::{create_session_layer, session::SESSION_COOKIE_NAME};
use online_store_storefront::models::{NewProduct, Product};
use online_store_storefront::routes;
use online_store_storefront::services::ImageStorage;
use online_store_storefront::state::AppState;

/// A complete storefront wired to in-memory backends.
///
/// Acts like a single browser: the session cookie from one response is sent
/// with every later request.
pub struct TestApp {
    service: NormalizePath<Router>,
    state: AppState,
    cookie: Option<String>,
    media: TempDir,
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// Body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).unwrap()
    }

    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }
}

impl TestApp {
    /// Storefront with local-disk image storage under a temporary media root.
    #[must_use]
    pub fn new() -> Self {
        let media = TempDir::new().unwrap();
        let config = StorefrontConfig::in_memory(media.path());
        Self::build(AppState::in_memory(config), media)
    }

    /// Storefront whose `/image` routes use the given storage.
    #[must_use]
    pub fn with_image_storage(images: Arc<dyn ImageStorage>) -> Self {
        let media = TempDir::new().unwrap();
        let config = StorefrontConfig::in_memory(media.path());
        let state = AppState::new(config, None, Repositories::in_memory(), images);
        Self::build(state, media)
    }

    fn build(state: AppState, media: TempDir) -> Self {
        let session_layer = create_session_layer(MemoryStore::default(), state.config());
        Self {
            service: routes::app(state.clone(), session_layer),
            state,
            cookie: None,
            media,
        }
    }

    /// Shared application state, for seeding and inspecting backends.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Directory uploads are written to.
    #[must_use]
    pub fn media_root(&self) -> &Path {
        self.media.path()
    }

    /// Forget the session cookie, as a fresh browser would.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    /// Send a request, attaching and capturing the session cookie.
    pub async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.service.clone().oneshot(request).await.unwrap();

        let session_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
            .map(ToOwned::to_owned);
        if session_cookie.is_some() {
            self.cookie = session_cookie;
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET uri`.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// `POST uri` with an empty body, as the cart buttons do.
    pub async fn post(&mut self, uri: &str) -> TestResponse {
        self.send(Request::post(uri).body(Body::empty()).unwrap())
            .await
    }

    /// `POST uri` with a URL-encoded form body.
    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()))
            .unwrap();
        self.send(request).await
    }

    /// JSON API call, optionally authenticated with `Token <token>`.
    pub async fn api(
        &mut self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Sign up through the API and return the issued token.
    pub async fn signup(&mut self, username: &str, password: &str) -> String {
        let response = self
            .api(
                Method::POST,
                "/api/signup",
                Some(serde_json::json!({ "username": username, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()["token"].as_str().unwrap().to_owned()
    }

    /// `POST uri` with a single-file multipart body.
    pub async fn upload(
        &mut self,
        uri: &str,
        field: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> TestResponse {
        const BOUNDARY: &str = "online-store-test-boundary";

        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Insert a product straight into the catalog.
    pub async fn seed_product(&self, name: &str, price: &str) -> Product {
        let product = NewProduct::new(name, Price::parse(price).unwrap()).unwrap();
        self.state.products().create(&product).await.unwrap()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
