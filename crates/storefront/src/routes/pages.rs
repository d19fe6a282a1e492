//! Static page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::filters;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub title: String,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
}

/// Display the home page.
#[instrument]
pub async fn home() -> impl IntoResponse {
    HomeTemplate {
        title: "Online Store".to_string(),
    }
}

/// Display the about page.
#[instrument]
pub async fn about() -> impl IntoResponse {
    AboutTemplate {
        title: "About us - Online Store".to_string(),
        subtitle: "About us".to_string(),
        description: "This is an about page ...".to_string(),
        author: "Developed by: J.D".to_string(),
    }
}
