use std::path::Path;

use image::{DynamicImage, imageops::FilterType};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{OpticsError, OpticsResult};
use crate::source::image::SourceImage;

/// Decode encoded image bytes into a [`SourceImage`], downsizing so the longer side is at most
/// `max_side`.
pub fn decode_source(bytes: &[u8], max_side: u32) -> OpticsResult<SourceImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| OpticsError::source_unavailable(format!("decode image from memory: {e}")))?;
    from_dynamic(dyn_img, max_side)
}

/// Read and decode an image file; see [`decode_source`].
pub fn load_source(path: &Path, max_side: u32) -> OpticsResult<SourceImage> {
    let bytes = std::fs::read(path).map_err(|e| {
        OpticsError::source_unavailable(format!("read image '{}': {e}", path.display()))
    })?;
    decode_source(&bytes, max_side)
}

fn from_dynamic(dyn_img: DynamicImage, max_side: u32) -> OpticsResult<SourceImage> {
    let channel_count = if dyn_img.color().has_alpha() { 4 } else { 3 };
    let dyn_img = downsize(dyn_img, max_side);
    // 16-bit and float inputs collapse into the one RGBA8 domain here.
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba
        .pixels()
        .map(|p| Rgba8::new(p[0], p[1], p[2], p[3]))
        .collect();
    SourceImage::from_pixels(width, height, channel_count, pixels)
}

fn downsize(img: DynamicImage, max_side: u32) -> DynamicImage {
    let max_side = max_side.max(1);
    if img.width() <= max_side && img.height() <= max_side {
        return img;
    }
    tracing::debug!(
        width = img.width(),
        height = img.height(),
        max_side,
        "downsizing source image"
    );
    img.resize(max_side, max_side, FilterType::Triangle)
}

#[cfg(test)]
#[path = "../../tests/unit/source/decode.rs"]
mod tests;
