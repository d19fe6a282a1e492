//! Image upload route handlers.
//!
//! `/image` stores uploads through the storage strategy held in `AppState`;
//! `/image-no-di` builds a local-disk storage inside the handler. Both behave
//! the same from the browser's point of view.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Redirect},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::services::images::{self, ImageError, ImageUpload, LocalImageStorage};
use crate::state::AppState;

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "profile_image";

/// Image upload page template.
#[derive(Template, WebTemplate)]
#[template(path = "images/index.html")]
pub struct ImageTemplate {
    pub title: String,
    pub action: &'static str,
    pub image_url: String,
}

async fn render(session: &Session, action: &'static str) -> Result<ImageTemplate> {
    Ok(ImageTemplate {
        title: "Upload image - Online Store".to_string(),
        action,
        image_url: images::current_image_url(session).await?,
    })
}

/// Pull the image field out of a multipart body.
///
/// Rejections keep their own status, so an over-limit body answers 413.
async fn read_upload(multipart: &mut Multipart) -> Result<ImageUpload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(ToOwned::to_owned);
        let content_type = field.content_type().map(ToOwned::to_owned);
        let bytes = field.bytes().await?;

        return Ok(ImageUpload {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(ImageError::Missing.into())
}

/// Display the upload form (injected storage).
///
/// # Errors
///
/// Returns an error if the session cannot be read.
#[instrument(skip(session))]
pub async fn index(session: Session) -> Result<impl IntoResponse> {
    render(&session, "/image").await
}

/// Store an upload with the injected storage.
///
/// # Errors
///
/// Returns 400 for a missing or non-image upload.
#[instrument(skip(state, session, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let upload = read_upload(&mut multipart).await?;
    images::intake(state.images(), &session, &upload).await?;

    Ok(Redirect::to("/image"))
}

/// Display the upload form (handler-built storage).
///
/// # Errors
///
/// Returns an error if the session cannot be read.
#[instrument(skip(session))]
pub async fn index_no_di(session: Session) -> Result<impl IntoResponse> {
    render(&session, "/image-no-di").await
}

/// Store an upload with a storage built from configuration.
///
/// # Errors
///
/// Returns 400 for a missing or non-image upload.
#[instrument(skip(state, session, multipart))]
pub async fn upload_no_di(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let upload = read_upload(&mut multipart).await?;
    let storage = LocalImageStorage::from_config(&state.config().media);
    images::intake(&storage, &session, &upload).await?;

    Ok(Redirect::to("/image-no-di"))
}
