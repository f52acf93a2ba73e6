use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde_json::Value;
use shared::{
    error::ApiErrorBody,
    protocol::{CreatedPhoto, PhotoListing},
};
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub mod error;
pub mod gallery;
pub mod view;

pub use config::{load_settings, Settings};
pub use error::ServiceError;
pub use gallery::{GalleryController, GalleryEvent, GalleryState, LoadOutcome, UploadOutcome};
pub use view::{GalleryBody, GalleryView, PhotoCard};

/// Extensions offered by file pickers for uploads.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

const DEFAULT_UPLOAD_MIME: &str = "application/octet-stream";

#[async_trait]
pub trait PhotoService: Send + Sync {
    async fn list_photos(&self) -> Result<PhotoListing>;
    async fn create_photo(&self, request: UploadRequest) -> Result<CreatedPhoto>;
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: String,
    pub mime_type: String,
    pub title: String,
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    /// Title defaults to the filename.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let mime_type = mime_guess::from_path(&filename)
            .first_raw()
            .unwrap_or(DEFAULT_UPLOAD_MIME)
            .to_string();
        Self {
            title: filename.clone(),
            filename,
            mime_type,
            bytes,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
            self.title = title;
        }
        self
    }

    pub async fn from_path(path: &Path) -> std::result::Result<Self, ServiceError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ServiceError::ReadFile {
                path: path.to_path_buf(),
                source,
            })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(filename, bytes))
    }
}

/// HTTP client for the photo backend.
#[derive(Debug, Clone)]
pub struct PhotoClient {
    http: Client,
    base_url: Url,
}

impl PhotoClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn from_settings(settings: &Settings) -> std::result::Result<Self, ServiceError> {
        Ok(Self::new(settings.base_url()?))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Photo `image` fields may be absolute or relative to the backend.
    pub fn resolve_image_url(&self, image: &str) -> std::result::Result<Url, ServiceError> {
        self.join(image)
    }

    pub async fn fetch_image(&self, image: &str) -> std::result::Result<Vec<u8>, ServiceError> {
        let url = self.resolve_image_url(image)?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                detail: None,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    fn join(&self, path: &str) -> std::result::Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|source| ServiceError::InvalidUrl {
                input: path.to_string(),
                source,
            })
    }

    async fn read_json(response: Response) -> std::result::Result<Value, ServiceError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                detail: ApiErrorBody::summarize(&body),
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        // Non-JSON success bodies are treated as an unexpected shape.
        Ok(serde_json::from_str(&body).unwrap_or_else(|err| {
            warn!("response body is not json: {err}");
            Value::Null
        }))
    }
}

#[async_trait]
impl PhotoService for PhotoClient {
    async fn list_photos(&self) -> Result<PhotoListing> {
        let url = self.join("photos/")?;
        debug!(%url, "listing photos");
        let response = self.http.get(url).send().await.map_err(ServiceError::from)?;
        let body = Self::read_json(response).await?;

        let listing = PhotoListing::from_json(body);
        match &listing {
            PhotoListing::Photos { photos, skipped } => {
                if *skipped > 0 {
                    warn!(skipped, "dropped malformed photo entries");
                }
                info!(count = photos.len(), "listed photos");
            }
            PhotoListing::NotASequence => warn!("photo listing was not a json array"),
        }
        Ok(listing)
    }

    async fn create_photo(&self, request: UploadRequest) -> Result<CreatedPhoto> {
        let url = self.join("photos/")?;
        info!(
            filename = %request.filename,
            size_bytes = request.bytes.len(),
            "uploading photo"
        );
        let image = Part::bytes(request.bytes)
            .file_name(request.filename)
            .mime_str(&request.mime_type)
            .map_err(ServiceError::from)?;
        let form = Form::new().text("title", request.title).part("image", image);

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(ServiceError::from)?;
        let body = Self::read_json(response).await?;
        Ok(CreatedPhoto::from_json(body))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
