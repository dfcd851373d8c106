use std::ops::RangeInclusive;

use crate::cancel::registry::{Aborted, CancelCheck};
use crate::foundation::core::{PixelBox, Rgba8};
use crate::foundation::math::lerp_rgba;
use crate::raster::canvas::Canvas;

/// Fill background holes inside `bounds` by linear interpolation, columns first, then rows.
///
/// In each slice only pixels strictly between the first and last written pixel are touched,
/// each interpolated per channel from its nearest written neighbours. Slices with fewer than
/// two written pixels are left alone. Returns the number of pixels filled.
///
/// Cancellation is polled before the first slice of each pass and then every `poll_every`
/// slices.
pub fn fill_gaps(
    canvas: &mut Canvas,
    bounds: PixelBox,
    cancel: &dyn CancelCheck,
    poll_every: usize,
) -> Result<usize, Aborted> {
    let Some(b) = clamp(bounds, canvas) else {
        return Ok(0);
    };
    let poll_every = poll_every.max(1);
    let mut filled = 0;
    let mut known = Vec::new();

    for (i, x) in (b.min_x..=b.max_x).enumerate() {
        if i % poll_every == 0 {
            cancel.check()?;
        }
        filled += fill_slice(canvas, &mut known, b.min_y..=b.max_y, |y| (x, y));
    }
    for (i, y) in (b.min_y..=b.max_y).enumerate() {
        if i % poll_every == 0 {
            cancel.check()?;
        }
        filled += fill_slice(canvas, &mut known, b.min_x..=b.max_x, |x| (x, y));
    }

    tracing::trace!(filled, "gap fill done");
    Ok(filled)
}

/// Interpolate one column or row. `at` maps a position along the slice to canvas coordinates.
fn fill_slice(
    canvas: &mut Canvas,
    known: &mut Vec<(u32, Rgba8)>,
    span: RangeInclusive<u32>,
    at: impl Fn(u32) -> (u32, u32),
) -> usize {
    known.clear();
    for i in span {
        let (x, y) = at(i);
        if !canvas.is_background(x, y) {
            known.push((i, canvas.get(x, y)));
        }
    }
    let mut filled = 0;
    for pair in known.windows(2) {
        let [(i0, c0), (i1, c1)] = [pair[0], pair[1]];
        let len = f64::from(i1 - i0);
        for i in i0 + 1..i1 {
            let (x, y) = at(i);
            canvas.set(x, y, lerp_rgba(c0, c1, f64::from(i - i0) / len));
            filled += 1;
        }
    }
    filled
}

fn clamp(b: PixelBox, canvas: &Canvas) -> Option<PixelBox> {
    if canvas.width() == 0 || canvas.height() == 0 || b.min_x > b.max_x || b.min_y > b.max_y {
        return None;
    }
    let max_x = b.max_x.min(canvas.width() - 1);
    let max_y = b.max_y.min(canvas.height() - 1);
    if b.min_x > max_x || b.min_y > max_y {
        return None;
    }
    Some(PixelBox {
        max_x,
        max_y,
        ..b
    })
}

#[cfg(test)]
#[path = "../../tests/unit/raster/gap_fill.rs"]
mod tests;
