//! Product API endpoints.
//!
//! Listing is public; every other operation requires a token.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use online_store_core::{Price, ProductId};

use super::{ApiError, ApiJson, ApiPath, ApiResult};
use crate::middleware::ApiUser;
use crate::models::{NewProduct, Product, ProductChanges, ProductValidationError};
use crate::state::AppState;

/// Body of `POST /api/products`.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: Decimal,
}

/// Body of `PUT|PATCH /api/products/{id}`; omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<Decimal>,
}

fn price(amount: Decimal) -> Result<Price, ProductValidationError> {
    Ok(Price::new(amount)?)
}

/// List all products.
///
/// GET /api/products
///
/// # Errors
///
/// Returns 500 if the catalog cannot be read.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.products().list().await?))
}

/// Create a product.
///
/// POST /api/products
///
/// # Errors
///
/// Returns 400 if the name or price is invalid.
#[instrument(skip(state, _user))]
pub async fn create(
    State(state): State<AppState>,
    ApiUser(_user): ApiUser,
    ApiJson(body): ApiJson<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = NewProduct::new(&body.name, price(body.price)?)?;
    let created = state.products().create(&product).await?;

    tracing::info!(product_id = %created.id, "product created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Fetch one product.
///
/// GET /api/products/{id}
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip(state, _user))]
pub async fn retrieve(
    State(state): State<AppState>,
    ApiUser(_user): ApiUser,
    ApiPath(id): ApiPath<ProductId>,
) -> ApiResult<Json<Product>> {
    state
        .products()
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

/// Update a product.
///
/// PUT|PATCH /api/products/{id}
///
/// # Errors
///
/// Returns 400 for invalid fields, 404 if the product does not exist.
#[instrument(skip(state, _user))]
pub async fn update(
    State(state): State<AppState>,
    ApiUser(_user): ApiUser,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<UpdateProductRequest>,
) -> ApiResult<Json<Product>> {
    let price = body.price.map(price).transpose()?;
    let changes = ProductChanges::new(body.name.as_deref(), price)?;

    state
        .products()
        .update(id, &changes)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

/// Delete a product.
///
/// DELETE /api/products/{id}
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip(state, _user))]
pub async fn destroy(
    State(state): State<AppState>,
    ApiUser(_user): ApiUser,
    ApiPath(id): ApiPath<ProductId>,
) -> ApiResult<StatusCode> {
    if state.products().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found())
    }
}
