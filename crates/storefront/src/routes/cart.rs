//! Session cart route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tower_sessions::Session;
use tracing::instrument;

use online_store_core::ProductId;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::Product;
use crate::services::CartService;
use crate::state::AppState;

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/index.html")]
pub struct CartTemplate {
    pub title: String,
    pub subtitle: String,
    pub products: Vec<Product>,
    pub cart_products: Vec<Product>,
}

/// Display the cart page.
///
/// # Errors
///
/// Returns an error if the session or catalog cannot be read.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let view = CartService::new(&session, state.products()).view().await?;

    Ok(CartTemplate {
        title: "Cart - Online Store".to_string(),
        subtitle: "Shopping Cart".to_string(),
        products: view.all_products,
        cart_products: view.cart_products,
    })
}

/// Add a product to the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    CartService::new(&session, state.products())
        .add(product_id)
        .await?;
    add_breadcrumb(
        "cart",
        "Added product to cart",
        Some(&[("product_id", &product_id.to_string())]),
    );

    Ok(Redirect::to("/cart"))
}

/// Remove one product from the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    CartService::new(&session, state.products())
        .remove(product_id)
        .await?;

    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip(state, session))]
pub async fn remove_all(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    CartService::new(&session, state.products()).clear().await?;

    Ok(Redirect::to("/cart"))
}
