use serde_json::Value;

use crate::domain::Photo;

/// Decoded body of `GET /photos/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoListing {
    Photos {
        photos: Vec<Photo>,
        /// Array entries without a decodable `id`.
        skipped: usize,
    },
    NotASequence,
}

impl PhotoListing {
    pub fn from_json(value: Value) -> Self {
        let Value::Array(items) = value else {
            return PhotoListing::NotASequence;
        };

        let total = items.len();
        let photos: Vec<Photo> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        let skipped = total - photos.len();
        PhotoListing::Photos { photos, skipped }
    }

    pub fn into_photos(self) -> Vec<Photo> {
        match self {
            PhotoListing::Photos { photos, .. } => photos,
            PhotoListing::NotASequence => Vec::new(),
        }
    }
}

/// Decoded body of `POST /photos/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedPhoto {
    Created(Photo),
    /// Empty, non-object, or missing a usable `id`.
    Unknown,
}

impl CreatedPhoto {
    pub fn from_json(value: Value) -> Self {
        if !value.is_object() {
            return CreatedPhoto::Unknown;
        }
        match serde_json::from_value::<Photo>(value) {
            Ok(photo) if photo.id.is_usable() => CreatedPhoto::Created(photo),
            _ => CreatedPhoto::Unknown,
        }
    }
}
