//! UI-side model and the transitions driven by backend events.

use std::collections::{HashMap, HashSet};

use client_core::GalleryState;
use shared::domain::PhotoId;

use crate::controller::events::{UiError, UiEvent};
use crate::media::PreviewImage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailState {
    Loading,
    Ready(PreviewImage),
    Failed(String),
}

#[derive(Default)]
pub struct GalleryModel {
    /// Last state published by the backend controller.
    pub gallery: GalleryState,
    pub thumbnails: HashMap<PhotoId, ThumbnailState>,
    pub status: String,
    pub banner: Option<UiError>,
}

impl GalleryModel {
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::GalleryUpdated(state) => {
                let live: HashSet<&PhotoId> = state.photos.iter().map(|photo| &photo.id).collect();
                self.thumbnails.retain(|id, _| live.contains(id));
                self.gallery = state;
            }
            UiEvent::ThumbnailLoaded { photo_id, image } => {
                self.thumbnails
                    .insert(photo_id, ThumbnailState::Ready(image));
            }
            UiEvent::ThumbnailFailed { photo_id, reason } => {
                tracing::debug!(%photo_id, %reason, "thumbnail unavailable");
                self.thumbnails
                    .insert(photo_id, ThumbnailState::Failed(reason));
            }
            UiEvent::Error(err) => {
                tracing::warn!(context = ?err.context(), "{}", err.message());
                self.banner = Some(err);
            }
        }
    }

    /// Marks a thumbnail as requested; returns false when it already was.
    pub fn request_thumbnail(&mut self, photo_id: &PhotoId) -> bool {
        if self.thumbnails.contains_key(photo_id) {
            return false;
        }
        self.thumbnails
            .insert(photo_id.clone(), ThumbnailState::Loading);
        true
    }

    /// Undoes `request_thumbnail` when the fetch never reached the backend,
    /// so the card asks again on a later frame.
    pub fn thumbnail_dispatch_failed(&mut self, photo_id: &PhotoId, err: UiError) {
        if matches!(self.thumbnails.get(photo_id), Some(ThumbnailState::Loading)) {
            self.thumbnails.remove(photo_id);
        }
        self.banner = Some(err);
    }
}
