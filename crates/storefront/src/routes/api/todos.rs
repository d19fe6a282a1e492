//! Todo API endpoints.
//!
//! Every operation is scoped to the caller. Another user's todo answers 404,
//! exactly like one that does not exist.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use online_store_core::TodoId;

use super::{ApiError, ApiJson, ApiPath, ApiResult};
use crate::middleware::ApiUser;
use crate::models::{NewTodo, Todo, TodoChanges};
use crate::state::AppState;

/// Body of `POST /api/todos`. Unknown fields such as `owner` are ignored.
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub content: String,
    #[serde(default)]
    pub completed: bool,
}

/// Body of `PUT|PATCH /api/todos/{id}`; omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub content: Option<String>,
    pub completed: Option<bool>,
}

/// List the caller's todos, newest first.
///
/// GET /api/todos
///
/// # Errors
///
/// Returns 401 without a valid token.
#[instrument(skip(state, user))]
pub async fn list(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
) -> ApiResult<Json<Vec<Todo>>> {
    Ok(Json(state.todos().list(user.id).await?))
}

/// Create a todo owned by the caller.
///
/// POST /api/todos
///
/// # Errors
///
/// Returns 400 if the content is invalid.
#[instrument(skip(state, user))]
pub async fn create(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    ApiJson(body): ApiJson<CreateTodoRequest>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let todo = NewTodo::new(&body.content, body.completed)?;
    let created = state.todos().create(user.id, &todo).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Fetch one of the caller's todos.
///
/// GET /api/todos/{id}
///
/// # Errors
///
/// Returns 404 unless the caller owns the todo.
#[instrument(skip(state, user))]
pub async fn retrieve(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    ApiPath(id): ApiPath<TodoId>,
) -> ApiResult<Json<Todo>> {
    state
        .todos()
        .get(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

/// Update one of the caller's todos.
///
/// PUT|PATCH /api/todos/{id}
///
/// # Errors
///
/// Returns 400 for invalid content, 404 unless the caller owns the todo.
#[instrument(skip(state, user))]
pub async fn update(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    ApiPath(id): ApiPath<TodoId>,
    ApiJson(body): ApiJson<UpdateTodoRequest>,
) -> ApiResult<Json<Todo>> {
    let changes = TodoChanges::new(body.content.as_deref(), body.completed)?;

    state
        .todos()
        .update(user.id, id, &changes)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

/// Delete one of the caller's todos.
///
/// DELETE /api/todos/{id}
///
/// # Errors
///
/// Returns 404 unless the caller owns the todo.
#[instrument(skip(state, user))]
pub async fn destroy(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    ApiPath(id): ApiPath<TodoId>,
) -> ApiResult<StatusCode> {
    if state.todos().delete(user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found())
    }
}

/// Flip the completed flag of one of the caller's todos.
///
/// PUT|PATCH /api/todos/{id}/toggle
///
/// Any request body is ignored; the flag is only ever inverted.
///
/// # Errors
///
/// Returns 404 unless the caller owns the todo.
#[instrument(skip(state, user))]
pub async fn toggle(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    ApiPath(id): ApiPath<TodoId>,
) -> ApiResult<Json<Todo>> {
    state
        .todos()
        .toggle(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}
