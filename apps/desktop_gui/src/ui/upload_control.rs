//! File selection state for the upload button.

use std::path::PathBuf;

/// Holds the file picked for upload until the app hands it to the backend.
///
/// The selection is cleared as soon as it is taken, so picking the same file
/// again on a later attempt is a fresh selection.
#[derive(Debug, Default)]
pub struct UploadControl {
    selection: Option<PathBuf>,
}

impl UploadControl {
    pub fn select(&mut self, path: Option<PathBuf>) {
        self.selection = path;
    }

    pub fn take_selection(&mut self) -> Option<PathBuf> {
        self.selection.take()
    }

    #[cfg(test)]
    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }
}
