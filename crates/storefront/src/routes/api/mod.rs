//! JSON API routes.
//!
//! Every failure is answered with `{"error": "<message>"}`. Authenticated
//! endpoints take an [`ApiUser`](crate::middleware::ApiUser) extractor.

pub mod auth;
pub mod products;
pub mod todos;

use axum::{
    Json, Router,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;

use crate::db::RepositoryError;
use crate::middleware::{auth_rate_limiter, rate_limited_as_json};
use crate::models::{ProductValidationError, TodoValidationError};
use crate::services::AccountError;
use crate::state::AppState;

/// Error response for API endpoints.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 401; the response advertises the `Token` scheme.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// 404.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found.")
    }

    /// 405.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed.")
    }

    /// 429.
    #[must_use]
    pub fn too_many_requests() -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "Too many requests.")
    }

    /// 500; the cause is reported to Sentry, never to the client.
    pub fn internal(err: &(dyn std::error::Error + 'static)) -> Self {
        let event_id = sentry::capture_error(err);
        tracing::error!(error = %err, sentry_event_id = %event_id, "API error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            Json(ErrorBody {
                error: &self.message,
            }),
        )
            .into_response();

        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
        }

        response
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self::internal(&err)
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidUsername(_)
            | AccountError::EmptyPassword
            | AccountError::UsernameTaken
            | AccountError::InvalidCredentials => Self::bad_request(err.to_string()),
            AccountError::InvalidToken => Self::unauthorized("Invalid token."),
            AccountError::PasswordHash | AccountError::Repository(_) => Self::internal(&err),
        }
    }
}

impl From<ProductValidationError> for ApiError {
    fn from(err: ProductValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<TodoValidationError> for ApiError {
    fn from(err: TodoValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self::not_found()
    }
}

/// JSON body extractor whose rejections use the API error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections are API 404s.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Result type alias for `ApiError`.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Create the API router.
///
/// Unknown paths answer 404 and unsupported methods 405, both as JSON.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::retrieve)
                .put(products::update)
                .patch(products::update)
                .delete(products::destroy),
        )
        .route("/todos", get(todos::list).post(todos::create))
        .route(
            "/todos/{id}",
            get(todos::retrieve)
                .put(todos::update)
                .patch(todos::update)
                .delete(todos::destroy),
        )
        .route(
            "/todos/{id}/toggle",
            put(todos::toggle).patch(todos::toggle),
        )
        .fallback(|| async { ApiError::not_found() })
        .method_not_allowed_fallback(|| async { ApiError::method_not_allowed() })
}

/// Signup and login, behind the per-client rate limiter.
fn auth_routes() -> Router<AppState> {
    let routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .method_not_allowed_fallback(|| async { ApiError::method_not_allowed() });

    match auth_rate_limiter() {
        Some(limiter) => routes
            .layer(limiter)
            .layer(axum::middleware::map_response(rate_limited_as_json)),
        None => {
            tracing::warn!("Auth rate limiter rejected its quota; running without it");
            routes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_error_mapping() {
        let err = ApiError::from(AccountError::UsernameTaken);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "username taken. choose another username");

        let err = ApiError::from(AccountError::InvalidCredentials);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "unable to login. check username and password");

        let err = ApiError::from(AccountError::InvalidToken);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err = ApiError::from(AccountError::PasswordHash);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_unauthorized_sets_www_authenticate() {
        let response = ApiError::unauthorized("nope").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Token");

        let response = ApiError::not_found().into_response();
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }
}
