//! UI layer for the desktop gallery: app shell, card grid, and the upload control.

pub mod app;
pub mod upload_control;

pub use app::GalleryApp;
