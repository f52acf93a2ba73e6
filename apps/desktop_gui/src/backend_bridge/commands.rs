//! Backend commands queued from UI to backend worker.

use shared::domain::PhotoId;
use std::path::PathBuf;

pub enum BackendCommand {
    LoadPhotos,
    UploadPhoto { path: PathBuf },
    FetchThumbnail { photo_id: PhotoId, image: String },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadPhotos => "load_photos",
            BackendCommand::UploadPhoto { .. } => "upload_photo",
            BackendCommand::FetchThumbnail { .. } => "fetch_thumbnail",
        }
    }
}
