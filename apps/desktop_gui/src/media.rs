//! Thumbnail decoding for gallery cards.

/// Longest edge of a decoded card thumbnail, in pixels.
pub const THUMBNAIL_MAX_EDGE: u32 = 512;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

pub fn decode_preview_image(bytes: &[u8]) -> Result<PreviewImage, String> {
    let dynamic = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let resized = if dynamic.width() > THUMBNAIL_MAX_EDGE || dynamic.height() > THUMBNAIL_MAX_EDGE {
        dynamic.thumbnail(THUMBNAIL_MAX_EDGE, THUMBNAIL_MAX_EDGE)
    } else {
        dynamic
    }
    .to_rgba8();
    let width = resized.width() as usize;
    let height = resized.height() as usize;
    Ok(PreviewImage {
        width,
        height,
        rgba: resized.into_raw(),
    })
}
