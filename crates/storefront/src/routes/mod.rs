//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /about                     - About page
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check
//!
//! # Products
//! GET  /products                  - Product listing
//! GET  /products/{id}             - Product detail
//! GET  /products/create           - Product form
//! POST /products/create           - Create product
//!
//! # Cart (session)
//! GET  /cart                      - Cart page
//! POST /cart/add/{product_id}     - Add product, redirect to /cart
//! POST /cart/remove/{product_id}  - Remove product, redirect to /cart
//! POST /cart/remove-all           - Empty cart, redirect to /cart
//!
//! # Images (session)
//! GET  /image                     - Upload form (injected storage)
//! POST /image                     - Upload (injected storage)
//! GET  /image-no-di               - Upload form (handler-built storage)
//! POST /image-no-di               - Upload (handler-built storage)
//! GET  /media/...                 - Uploaded files
//!
//! # JSON API (token auth)
//! POST /api/signup                - Create account, returns token
//! POST /api/login                 - Returns the account's token
//! GET  /api/products              - Product list (public)
//! POST /api/products              - Create product
//! *    /api/products/{id}         - Retrieve/update/delete product
//! GET  /api/todos                 - Caller's todos
//! POST /api/todos                 - Create todo
//! *    /api/todos/{id}            - Retrieve/update/delete todo
//! PUT  /api/todos/{id}/toggle     - Flip completed
//! ```
//!
//! Trailing slashes are trimmed before routing, so `/api/todos/` and
//! `/api/todos` are the same endpoint.

pub mod api;
pub mod cart;
pub mod health;
pub mod images;
pub mod pages;
pub mod products;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    middleware,
    routing::{get, post},
};
use tower::Layer;
use tower_http::{
    normalize_path::{NormalizePath, NormalizePathLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Create the product page routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route(
            "/create",
            get(products::create_form).post(products::create),
        )
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add/{product_id}", post(cart::add))
        .route("/remove/{product_id}", post(cart::remove))
        .route("/remove-all", post(cart::remove_all))
}

/// Create the image upload routes router.
pub fn image_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/image", get(images::index).post(images::upload))
        .route(
            "/image-no-di",
            get(images::index_no_di).post(images::upload_no_di),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Create all routes for the storefront.
pub fn routes(state: &AppState) -> Router<AppState> {
    let media = &state.config().media;

    let router = Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .merge(image_routes(media.max_upload_bytes))
        .nest("/api", api::router());

    // A media URL of "/" trims to an empty prefix, which cannot be nested.
    if media.url.is_empty() {
        router
    } else {
        router.nest_service(&media.url, ServeDir::new(&media.root))
    }
}

/// Build the complete application: routes, session handling and the
/// middleware stack.
///
/// Generic over the session store so production can use `PostgresStore` while
/// in-memory mode and tests use `MemoryStore`.
pub fn app<Store>(state: AppState, session_layer: SessionManagerLayer<Store>) -> NormalizePath<Router>
where
    Store: SessionStore + Clone,
{
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
            user_id = tracing::field::Empty,
        )
    });

    let router = routes(&state)
        .layer(session_layer)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
