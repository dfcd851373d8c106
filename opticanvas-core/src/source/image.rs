use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{OpticsError, OpticsResult};

/// Dimensions of a source raster, the only thing strategies need to know up front.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceBounds {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Immutable source raster, normalized to straight RGBA8.
///
/// Cloning is cheap (pixels are shared), and nothing ever mutates the pixels after
/// construction, so one image can feed any number of concurrent requests.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    channel_count: u8,
    pixels: Arc<Vec<Rgba8>>,
}

impl SourceImage {
    /// Build from row-major pixels. `channel_count` records whether the origin had alpha.
    pub fn from_pixels(
        width: u32,
        height: u32,
        channel_count: u8,
        pixels: Vec<Rgba8>,
    ) -> OpticsResult<Self> {
        if width == 0 || height == 0 {
            return Err(OpticsError::source_unavailable("source image has zero size"));
        }
        if !matches!(channel_count, 3 | 4) {
            return Err(OpticsError::source_unavailable(format!(
                "unsupported channel count {channel_count}"
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| OpticsError::source_unavailable("source image size overflow"))?;
        if pixels.len() != expected {
            return Err(OpticsError::source_unavailable(format!(
                "expected {expected} pixels for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channel_count,
            pixels: Arc::new(pixels),
        })
    }

    /// Build from tightly packed RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> OpticsResult<Self> {
        let pixels = pack_channels(data, 4, |px| Rgba8::new(px[0], px[1], px[2], px[3]))?;
        Self::from_pixels(width, height, 4, pixels)
    }

    /// Build from tightly packed RGB8 bytes (alpha becomes opaque).
    pub fn from_rgb8(width: u32, height: u32, data: &[u8]) -> OpticsResult<Self> {
        let pixels = pack_channels(data, 3, |px| Rgba8::new(px[0], px[1], px[2], 255))?;
        Self::from_pixels(width, height, 3, pixels)
    }

    /// Build from float channels in `[0, 1]`; `channels` must be 3 or 4.
    ///
    /// Values are clamped and rounded into the RGBA8 domain; NaN becomes 0.
    pub fn from_rgba_f32(
        width: u32,
        height: u32,
        channels: u8,
        data: &[f32],
    ) -> OpticsResult<Self> {
        fn q(v: f32) -> u8 {
            if v.is_nan() {
                return 0;
            }
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        let pixels = match channels {
            3 => pack_channels(data, 3, |px| Rgba8::new(q(px[0]), q(px[1]), q(px[2]), 255))?,
            4 => pack_channels(data, 4, |px| {
                Rgba8::new(q(px[0]), q(px[1]), q(px[2]), q(px[3]))
            })?,
            other => {
                return Err(OpticsError::source_unavailable(format!(
                    "unsupported channel count {other}"
                )));
            }
        };
        Self::from_pixels(width, height, channels, pixels)
    }

    /// Default stand-in image: an opaque red square inset by 10% on a transparent field.
    pub fn placeholder(side: u32) -> Self {
        let side = side.max(1);
        let inset = side / 10;
        let mut pixels = vec![Rgba8::new(0, 0, 0, 0); (side as usize) * (side as usize)];
        for y in inset..side - inset {
            for x in inset..side - inset {
                pixels[(y * side + x) as usize] = Rgba8::new(255, 0, 0, 255);
            }
        }
        Self {
            width: side,
            height: side,
            channel_count: 4,
            pixels: Arc::new(pixels),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// 3 for sources without alpha, 4 otherwise.
    pub fn channel_count(&self) -> u8 {
        self.channel_count
    }

    /// Width and height.
    pub fn bounds(&self) -> SourceBounds {
        SourceBounds {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel at column `x`, row `y`. Panics when out of range.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        self.pixels[(y as usize) * (self.width as usize) + x as usize]
    }

    /// One full row, left to right.
    pub fn row(&self, y: u32) -> &[Rgba8] {
        let w = self.width as usize;
        let start = (y as usize) * w;
        &self.pixels[start..start + w]
    }
}

fn pack_channels<T: Copy>(
    data: &[T],
    stride: usize,
    f: impl Fn(&[T]) -> Rgba8,
) -> OpticsResult<Vec<Rgba8>> {
    if data.len() % stride != 0 {
        return Err(OpticsError::source_unavailable(format!(
            "buffer length {} is not a multiple of {stride}",
            data.len()
        )));
    }
    Ok(data.chunks_exact(stride).map(f).collect())
}

#[cfg(test)]
#[path = "../../tests/unit/source/image.rs"]
mod tests;
