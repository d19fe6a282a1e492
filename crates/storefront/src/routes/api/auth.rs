//! Signup and login endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use online_store_core::ApiToken;

use super::{ApiJson, ApiResult};
use crate::services::AccountService;
use crate::state::AppState;

/// Username/password pair.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Issued token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: ApiToken,
}

/// Create an account.
///
/// POST /api/signup
///
/// # Errors
///
/// Returns 400 if the username is taken or the input is invalid.
#[instrument(skip(state))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let token = AccountService::new(state.accounts())
        .signup(&body.username, &body.password)
        .await?;

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// Exchange credentials for the account's token.
///
/// POST /api/login
///
/// # Errors
///
/// Returns 400 if the credentials are wrong.
#[instrument(skip(state))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let token = AccountService::new(state.accounts())
        .login(&body.username, &body.password)
        .await?;

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}
