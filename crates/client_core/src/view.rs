//! Render model for the gallery. Pure function of [`GalleryState`]; the
//! desktop window and the CLI only decide how to draw it.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use shared::domain::{Photo, PhotoId};

use crate::gallery::GalleryState;

pub const APP_TITLE: &str = "Aura Vault";
pub const LOADING_TEXT: &str = "Loading photos...";
pub const EMPTY_TEXT: &str = "No photos yet. Upload an image to get started.";
pub const DEFAULT_ALT_TEXT: &str = "Aura Vault photo";
pub const UPLOAD_LABEL: &str = "Upload";
pub const UPLOADING_LABEL: &str = "Uploading...";

const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryView {
    pub title: &'static str,
    pub upload_label: &'static str,
    pub upload_enabled: bool,
    pub error: Option<String>,
    pub body: GalleryBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryBody {
    Loading,
    Empty,
    Grid(Vec<PhotoCard>),
}

impl GalleryBody {
    pub fn status_text(&self) -> Option<&'static str> {
        match self {
            GalleryBody::Loading => Some(LOADING_TEXT),
            GalleryBody::Empty => Some(EMPTY_TEXT),
            GalleryBody::Grid(_) => None,
        }
    }

    pub fn cards(&self) -> &[PhotoCard] {
        match self {
            GalleryBody::Grid(cards) => cards,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoCard {
    pub id: PhotoId,
    /// Image reference as sent by the backend; resolved and fetched lazily.
    pub image: String,
    pub alt: String,
    pub meta: Option<CardMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMeta {
    pub title: Option<String>,
    pub uploaded_at: Option<String>,
}

impl GalleryView {
    pub fn from_state(state: &GalleryState) -> Self {
        let body = if state.loading {
            GalleryBody::Loading
        } else if state.photos.is_empty() {
            GalleryBody::Empty
        } else {
            GalleryBody::Grid(state.photos.iter().map(PhotoCard::from_photo).collect())
        };

        Self {
            title: APP_TITLE,
            upload_label: if state.uploading {
                UPLOADING_LABEL
            } else {
                UPLOAD_LABEL
            },
            upload_enabled: !state.uploading,
            error: state.error_message().map(str::to_string),
            body,
        }
    }
}

impl PhotoCard {
    pub fn from_photo(photo: &Photo) -> Self {
        let title = photo.display_title().map(str::to_string);
        let raw_uploaded_at = photo.raw_uploaded_at();
        // An unparseable timestamp still opens the meta block; only its date line is hidden.
        let meta = (title.is_some() || raw_uploaded_at.is_some()).then(|| CardMeta {
            title: title.clone(),
            uploaded_at: raw_uploaded_at.and_then(format_uploaded_at),
        });

        Self {
            id: photo.id.clone(),
            image: photo.image.clone(),
            alt: title.unwrap_or_else(|| DEFAULT_ALT_TEXT.to_string()),
            meta,
        }
    }
}

/// Local-time rendering of a server timestamp, or `None` when it is not a
/// date at all.
pub fn format_uploaded_at(raw: &str) -> Option<String> {
    format_uploaded_at_in(raw, &Local)
}

pub fn format_uploaded_at_in<Tz>(raw: &str, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let instant = parse_timestamp(raw.trim())?;
    Some(instant.with_timezone(tz).format(DISPLAY_FORMAT).to_string())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    // Offset-less date-times are wall-clock local time.
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc));
        }
    }
    // Date-only values are midnight UTC.
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
