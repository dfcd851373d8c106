use xxhash_rust::xxh3::Xxh3;

use crate::foundation::core::Rgba8;

/// Requested canvas dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Per-request output raster, pre-filled with a background sentinel.
///
/// Every write goes through [`Canvas::put`] or [`Canvas::set`], which nudge colours equal to the
/// sentinel, so "is background" always means "never written".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    background: Rgba8,
    pixels: Vec<Rgba8>,
}

impl Canvas {
    /// Canvas of `size` filled with `background`.
    pub fn new(size: CanvasSize, background: Rgba8) -> Self {
        let len = (size.width as usize) * (size.height as usize);
        Self {
            width: size.width,
            height: size.height,
            background,
            pixels: vec![background; len],
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

    /// Width and height.
    pub fn size(&self) -> CanvasSize {
        CanvasSize {
            width: self.width,
            height: self.height,
        }
    }

    /// The sentinel colour.
    pub fn background(&self) -> Rgba8 {
        self.background
    }

    /// Row-major pixels.
    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    /// Pixel at `(x, y)`. Panics when out of range.
    pub fn get(&self, x: u32, y: u32) -> Rgba8 {
        self.pixels[self.index(x, y)]
    }

    /// Whether `(x, y)` still holds the sentinel.
    pub fn is_background(&self, x: u32, y: u32) -> bool {
        self.get(x, y) == self.background
    }

    /// Write at signed coordinates; returns the in-bounds position, or `None` if the write was
    /// dropped.
    pub fn put(&mut self, x: i64, y: i64, colour: Rgba8) -> Option<(u32, u32)> {
        let x = u32::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u32::try_from(y).ok().filter(|&y| y < self.height)?;
        self.set(x, y, colour);
        Some((x, y))
    }

    /// Write at `(x, y)`. Panics when out of range.
    pub fn set(&mut self, x: u32, y: u32, colour: Rgba8) {
        let i = self.index(x, y);
        self.pixels[i] = colour.distinct_from(self.background);
    }

    /// Number of pixels that have been written.
    pub fn count_non_background(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != self.background).count()
    }

    /// Tightly packed straight-alpha RGBA8 bytes, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_array()).collect()
    }

    /// Consume the canvas into RGBA8 bytes.
    pub fn into_rgba8(self) -> Vec<u8> {
        self.to_rgba8()
    }

    /// Stable 64-bit digest of dimensions and pixels.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Xxh3::new();
        h.update(&self.width.to_le_bytes());
        h.update(&self.height.to_le_bytes());
        for p in &self.pixels {
            h.update(&p.to_array());
        }
        h.digest()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "canvas index out of range");
        (y as usize) * (self.width as usize) + x as usize
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/canvas.rs"]
mod tests;
