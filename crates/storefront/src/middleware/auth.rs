//! Bearer token authentication for the JSON API.
//!
//! Clients send `Authorization: Token <key>` (or `Bearer <key>`) on every
//! authenticated call. No session is involved.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::set_sentry_user;
use crate::models::User;
use crate::routes::api::ApiError;
use crate::services::AccountService;
use crate::state::AppState;

/// Schemes accepted in the `Authorization` header.
const SCHEMES: [&str; 2] = ["Token", "Bearer"];

/// Extractor that requires a valid API token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(ApiUser(user): ApiUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct ApiUser(pub User);

impl FromRequestParts<AppState> for ApiUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| {
                ApiError::unauthorized("Authentication credentials were not provided.")
            })?
            .to_str()
            .map_err(|_| ApiError::unauthorized("Invalid token header."))?;

        let token = credential(header)
            .ok_or_else(|| ApiError::unauthorized("Invalid token header."))?;

        let user = AccountService::new(state.accounts())
            .authenticate(token)
            .await?;

        set_sentry_user(&user.id, user.username.as_str());
        tracing::Span::current().record("user_id", tracing::field::display(user.id));

        Ok(Self(user))
    }
}

/// The key part of an `Authorization` header value, if the scheme is accepted.
fn credential(header: &str) -> Option<&str> {
    let (scheme, key) = header.trim().split_once(' ')?;
    let key = key.trim();
    let accepted = SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme));
    (accepted && !key.is_empty()).then_some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_schemes() {
        assert_eq!(credential("Token abc"), Some("abc"));
        assert_eq!(credential("Bearer abc"), Some("abc"));
        assert_eq!(credential("token  abc "), Some("abc"));
        assert_eq!(credential("Basic abc"), None);
        assert_eq!(credential("Token"), None);
        assert_eq!(credential("Token "), None);
    }
}
