//! Image intake.
//!
//! Uploads are handed to an [`ImageStorage`] strategy; the returned URL is
//! remembered in the session under [`session_keys::IMAGE_URL`].

use std::path::PathBuf;

use async_trait::async_trait;
use axum::body::Bytes;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::middleware::session::{SessionError, SessionState};
use crate::models::session_keys;

/// Directory (under the media root) uploads are written to.
pub const UPLOAD_DIR: &str = "uploaded_images";

/// Longest file extension kept from the uploaded name.
const MAX_EXTENSION_LENGTH: usize = 8;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum ImageStorageError {
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during image intake.
#[derive(Debug, Error)]
pub enum ImageError {
    /// No file, or a zero-length file, was uploaded.
    #[error("no image was uploaded")]
    Missing,

    /// The upload is not declared as an image.
    #[error("the uploaded file is not an image")]
    NotAnImage,

    #[error(transparent)]
    Storage(#[from] ImageStorageError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// An uploaded file.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Check that the upload is a non-empty image.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Missing` for an empty body and
    /// `ImageError::NotAnImage` unless the content type is `image/*`.
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.bytes.is_empty() {
            return Err(ImageError::Missing);
        }
        match self.content_type.as_deref() {
            Some(content_type) if content_type.starts_with("image/") => Ok(()),
            _ => Err(ImageError::NotAnImage),
        }
    }

    /// Sanitized extension of the uploaded file name, if it has a usable one.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.as_deref()?.rsplit_once('.')?;
        let valid = !ext.is_empty()
            && ext.len() <= MAX_EXTENSION_LENGTH
            && ext.bytes().all(|b| b.is_ascii_alphanumeric());
        valid.then(|| ext.to_ascii_lowercase())
    }
}

/// Where uploaded images end up.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Persist the upload and return the URL it is served from.
    async fn store(&self, upload: &ImageUpload) -> Result<String, ImageStorageError>;
}

/// Stores images on the local filesystem under the media root.
#[derive(Debug, Clone)]
pub struct LocalImageStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalImageStorage {
    /// Create a storage writing below `root`, served from `base_url`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    /// Create a storage from the media configuration.
    #[must_use]
    pub fn from_config(media: &MediaConfig) -> Self {
        Self::new(media.root.clone(), media.url.clone())
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    #[instrument(skip(self, upload), fields(size = upload.bytes.len()))]
    async fn store(&self, upload: &ImageUpload) -> Result<String, ImageStorageError> {
        let dir = self.root.join(UPLOAD_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = match upload.extension() {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        tokio::fs::write(dir.join(&file_name), &upload.bytes).await?;

        tracing::info!(%file_name, "image stored");
        Ok(format!(
            "{}/{UPLOAD_DIR}/{file_name}",
            self.base_url.trim_end_matches('/')
        ))
    }
}

/// Validate and store an upload, then remember its URL in the session.
///
/// # Errors
///
/// Returns an error if the upload is invalid, or storage or the session fails.
pub async fn intake(
    storage: &dyn ImageStorage,
    session: &dyn SessionState,
    upload: &ImageUpload,
) -> Result<String, ImageError> {
    upload.validate()?;
    let url = storage.store(upload).await?;
    session
        .set_value(session_keys::IMAGE_URL, Value::String(url.clone()))
        .await?;
    Ok(url)
}

/// The URL of the last image stored in this session, or an empty string.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn current_image_url(session: &dyn SessionState) -> Result<String, ImageError> {
    let url = session.get_value(session_keys::IMAGE_URL).await?;
    Ok(match url {
        Some(Value::String(url)) => url,
        _ => String::new(),
    })
}
