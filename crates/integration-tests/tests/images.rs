//! Image upload with injected and handler-built storage.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use tokio::sync::Mutex;

use online_store_integration_tests::TestApp;
use online_store_storefront::services::{ImageStorage, ImageStorageError, ImageUpload};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

/// Storage that keeps uploads in memory and serves them from a fake CDN.
#[derive(Default)]
struct RecordingStorage {
    stored: Mutex<Vec<ImageUpload>>,
}

#[async_trait]
impl ImageStorage for RecordingStorage {
    async fn store(&self, upload: &ImageUpload) -> Result<String, ImageStorageError> {
        let mut stored = self.stored.lock().await;
        stored.push(upload.clone());
        Ok(format!("https://cdn.example.com/{}.png", stored.len()))
    }
}

fn uploaded_files(app: &TestApp) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(app.media_root().join("uploaded_images"))
        .map(|entries| entries.map(|entry| entry.unwrap().path()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_upload_form_starts_without_image() {
    let mut app = TestApp::new();

    for uri in ["/image", "/image-no-di"] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::OK);
        let html = response.text();
        assert!(html.contains(&format!("action=\"{uri}\"")));
        assert!(!html.contains("<img"));
    }
}

#[tokio::test]
async fn test_injected_storage_is_used() {
    let storage = Arc::new(RecordingStorage::default());
    let mut app = TestApp::with_image_storage(storage.clone());

    let response = app
        .upload("/image", "profile_image", "cat.png", "image/png", PNG)
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/image"));

    let stored = storage.stored.lock().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].file_name.as_deref(), Some("cat.png"));
    assert_eq!(stored[0].bytes.as_ref(), PNG);
    drop(stored);

    let html = app.get("/image").await.text();
    assert!(html.contains("https://cdn.example.com/1.png"));

    // Nothing was written to local disk.
    assert!(uploaded_files(&app).is_empty());
}

#[tokio::test]
async fn test_handler_built_storage_writes_to_media_root() {
    let mut app = TestApp::new();

    let response = app
        .upload("/image-no-di", "profile_image", "cat.PNG", "image/png", PNG)
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/image-no-di"));

    let files = uploaded_files(&app);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].extension().unwrap(), "png");
    assert_eq!(std::fs::read(&files[0]).unwrap(), PNG);

    let file_name = files[0].file_name().unwrap().to_str().unwrap().to_owned();
    let url = format!("/media/uploaded_images/{file_name}");
    assert!(app.get("/image-no-di").await.text().contains(&url));

    let served = app.get(&url).await;
    assert_eq!(served.status, StatusCode::OK);
    assert_eq!(served.body.as_ref(), PNG);
}

#[tokio::test]
async fn test_image_url_is_per_session() {
    let mut app = TestApp::new();

    app.upload("/image", "profile_image", "cat.png", "image/png", PNG)
        .await;
    assert!(app.get("/image").await.text().contains("<img"));

    app.clear_cookies();
    assert!(!app.get("/image").await.text().contains("<img"));
}

#[tokio::test]
async fn test_missing_file_is_rejected() {
    let mut app = TestApp::new();

    let response = app
        .upload("/image", "something_else", "cat.png", "image/png", PNG)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .upload("/image", "profile_image", "empty.png", "image/png", b"")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert!(uploaded_files(&app).is_empty());
}

#[tokio::test]
async fn test_non_image_is_rejected() {
    let mut app = TestApp::new();

    let response = app
        .upload("/image-no-di", "profile_image", "notes.txt", "text/plain", b"hello")
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(uploaded_files(&app).is_empty());
    assert!(!app.get("/image-no-di").await.text().contains("<img"));
}

#[tokio::test]
async fn test_oversized_upload_is_payload_too_large() {
    let mut app = TestApp::new();
    let oversized = vec![0u8; 6 * 1024 * 1024];

    let response = app
        .upload("/image", "profile_image", "huge.png", "image/png", &oversized)
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(uploaded_files(&app).is_empty());
    assert!(!app.get("/image").await.text().contains("<img"));
}
