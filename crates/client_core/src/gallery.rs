//! Gallery state and the controller that keeps it in sync with the backend.

use std::{future::Future, path::Path, sync::Arc};

use shared::{
    domain::{Photo, PhotoId},
    protocol::CreatedPhoto,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{error::ServiceError, PhotoService, UploadRequest};

pub const LOAD_FAILURE_FALLBACK: &str = "Something went wrong while loading photos";
pub const UPLOAD_FAILURE_FALLBACK: &str = "Something went wrong while uploading";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryState {
    pub photos: Vec<Photo>,
    pub loading: bool,
    pub uploading: bool,
    pub error: Option<String>,
}

impl GalleryState {
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|message| !message.is_empty())
    }
}

#[derive(Debug, Clone)]
pub enum GalleryEvent {
    StateChanged(GalleryState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { count: usize },
    Failed(String),
    /// A newer load started before this one finished; its response was dropped.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    NoFile,
    AlreadyUploading,
    Inserted(PhotoId),
    /// The backend answered without a usable photo, so the list was reloaded.
    Reloaded,
    Failed(String),
}

struct ControllerInner {
    state: GalleryState,
    load_generation: u64,
}

pub struct GalleryController {
    service: Arc<dyn PhotoService>,
    inner: Mutex<ControllerInner>,
    events: broadcast::Sender<GalleryEvent>,
}

impl GalleryController {
    pub fn new(service: Arc<dyn PhotoService>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            service,
            inner: Mutex::new(ControllerInner {
                state: GalleryState::default(),
                load_generation: 0,
            }),
            events,
        })
    }

    pub async fn snapshot(&self) -> GalleryState {
        self.inner.lock().await.state.clone()
    }

    /// Every state transition is published, including the in-flight ones.
    pub fn subscribe_events(&self) -> broadcast::Receiver<GalleryEvent> {
        self.events.subscribe()
    }

    pub async fn load_photos(&self) -> LoadOutcome {
        let generation = {
            let mut inner = self.inner.lock().await;
            inner.load_generation += 1;
            inner.state.loading = true;
            inner.state.error = None;
            self.publish(&inner.state);
            inner.load_generation
        };
        debug!(generation, "photo load started");

        let result = self.service.list_photos().await;

        let mut inner = self.inner.lock().await;
        if inner.load_generation != generation {
            debug!(
                generation,
                latest = inner.load_generation,
                "discarding stale photo load"
            );
            return LoadOutcome::Superseded;
        }

        inner.state.loading = false;
        let outcome = match result {
            Ok(listing) => {
                inner.state.photos = listing.into_photos();
                LoadOutcome::Loaded {
                    count: inner.state.photos.len(),
                }
            }
            Err(err) => {
                let message = failure_message(&err, LOAD_FAILURE_FALLBACK);
                warn!(error = %message, "photo load failed");
                inner.state.error = Some(message.clone());
                LoadOutcome::Failed(message)
            }
        };
        self.publish(&inner.state);
        outcome
    }

    pub async fn upload_photo(&self, file: Option<UploadRequest>) -> UploadOutcome {
        let Some(file) = file else {
            return UploadOutcome::NoFile;
        };
        self.run_upload(async move { Ok(file) }).await
    }

    /// Reads the file as part of the upload, so read failures surface like
    /// any other upload failure.
    pub async fn upload_photo_from_path(
        &self,
        path: Option<&Path>,
        title: Option<String>,
    ) -> UploadOutcome {
        let Some(path) = path else {
            return UploadOutcome::NoFile;
        };
        let path = path.to_path_buf();
        self.run_upload(async move {
            Ok(UploadRequest::from_path(&path).await?.with_title(title))
        })
        .await
    }

    async fn run_upload<F>(&self, request: F) -> UploadOutcome
    where
        F: Future<Output = Result<UploadRequest, ServiceError>> + Send,
    {
        {
            let mut inner = self.inner.lock().await;
            if inner.state.uploading {
                warn!("upload requested while another upload is in flight");
                return UploadOutcome::AlreadyUploading;
            }
            inner.state.uploading = true;
            inner.state.error = None;
            self.publish(&inner.state);
        }

        let result = match request.await {
            Ok(request) => self.service.create_photo(request).await,
            Err(err) => Err(err.into()),
        };

        let outcome = {
            let mut inner = self.inner.lock().await;
            inner.state.uploading = false;
            let outcome = match result {
                Ok(CreatedPhoto::Created(photo)) => {
                    info!(photo_id = %photo.id, "photo uploaded");
                    let id = photo.id.clone();
                    inner.state.photos.insert(0, photo);
                    UploadOutcome::Inserted(id)
                }
                Ok(CreatedPhoto::Unknown) => {
                    warn!("upload response had no usable photo; reloading list");
                    UploadOutcome::Reloaded
                }
                Err(err) => {
                    let message = failure_message(&err, UPLOAD_FAILURE_FALLBACK);
                    warn!(error = %message, "photo upload failed");
                    inner.state.error = Some(message.clone());
                    UploadOutcome::Failed(message)
                }
            };
            self.publish(&inner.state);
            outcome
        };

        if outcome == UploadOutcome::Reloaded {
            self.load_photos().await;
        }
        outcome
    }

    fn publish(&self, state: &GalleryState) {
        let _ = self.events.send(GalleryEvent::StateChanged(state.clone()));
    }
}

fn failure_message(err: &anyhow::Error, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
#[path = "tests/gallery_tests.rs"]
mod tests;
