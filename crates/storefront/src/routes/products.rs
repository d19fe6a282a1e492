//! Product page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use online_store_core::ProductId;

use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{NewProduct, Product};
use crate::state::AppState;

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub title: String,
    pub subtitle: String,
    pub products: Vec<Product>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub title: String,
    pub subtitle: String,
    pub product: Product,
}

/// Product creation form template.
#[derive(Template, WebTemplate, Default)]
#[template(path = "products/create.html")]
pub struct ProductCreateTemplate {
    pub title: String,
    pub name: String,
    pub price: String,
    pub name_error: Option<String>,
    pub price_error: Option<String>,
}

/// Shown after a product was created.
#[derive(Template, WebTemplate)]
#[template(path = "products/created.html")]
pub struct ProductCreatedTemplate {
    pub title: String,
    pub product: Product,
}

/// Submitted product form.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
}

/// Display the product listing page.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let products = state.products().list().await?;

    Ok(ProductsIndexTemplate {
        title: "Products - Online Store".to_string(),
        subtitle: "List of products".to_string(),
        products,
    })
}

/// Display the product detail page.
///
/// Ids that are not positive integers redirect to the home page.
///
/// # Errors
///
/// Returns 404 if no product has the id.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let Some(id) = parse_product_id(&id) else {
        return Ok(Redirect::to("/").into_response());
    };

    let product = state
        .products()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductShowTemplate {
        title: format!("{} - Online Store", product.name),
        subtitle: format!("{} - Product information", product.name),
        product,
    }
    .into_response())
}

/// Display the product creation form.
#[instrument]
pub async fn create_form() -> impl IntoResponse {
    ProductCreateTemplate {
        title: "Create product".to_string(),
        ..ProductCreateTemplate::default()
    }
}

/// Handle the product creation form.
///
/// Invalid input re-renders the form with the submitted values and messages.
///
/// # Errors
///
/// Returns an error if the product cannot be stored.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let product = match NewProduct::from_form(&form.name, &form.price) {
        Ok(product) => product,
        Err(errors) => {
            return Ok(ProductCreateTemplate {
                title: "Create product".to_string(),
                name_error: errors.name.map(|e| e.to_string()),
                price_error: errors.price.map(|e| e.to_string()),
                name: form.name,
                price: form.price,
            }
            .into_response());
        }
    };

    let created = state.products().create(&product).await?;
    tracing::info!(product_id = %created.id, "product created");

    Ok(ProductCreatedTemplate {
        title: "Product created".to_string(),
        product: created,
    }
    .into_response())
}

fn parse_product_id(raw: &str) -> Option<ProductId> {
    raw.parse::<ProductId>().ok().filter(|id| id.as_i32() >= 1)
}
