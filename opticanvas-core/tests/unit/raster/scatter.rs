use std::cell::Cell;

use smallvec::smallvec;

use super::*;
use crate::cancel::registry::NeverCancel;
use crate::foundation::core::Rgba8;
use crate::raster::canvas::CanvasSize;
use crate::source::image::SourceBounds;
use crate::transform::{Emissions, MappedPoint};

/// Copies each pixel to `(2x, y)` as sparse and to `(x - 100, y)`, which is always off-canvas.
struct Spread;

impl TransformStrategy for Spread {
    fn name(&self) -> &'static str {
        "spread"
    }

    fn canvas_size(&self) -> CanvasSize {
        CanvasSize {
            width: 8,
            height: 4,
        }
    }

    fn sample_grid(&self) -> SourceBounds {
        SourceBounds {
            width: 3,
            height: 3,
        }
    }

    fn map(&self, x: u32, y: u32, source: &SourceImage) -> Emissions {
        let colour = source.pixel(x, y);
        smallvec![
            MappedPoint {
                dst_x: 2 * i64::from(x),
                dst_y: i64::from(y),
                colour,
                coverage: Coverage::Sparse,
            },
            MappedPoint {
                dst_x: i64::from(x) - 100,
                dst_y: i64::from(y),
                colour,
                coverage: Coverage::Dense,
            },
        ]
    }
}

fn source() -> SourceImage {
    let pixels = (0..9).map(|i| Rgba8::new(i * 20, 0, 0, 255)).collect();
    SourceImage::from_pixels(3, 3, 4, pixels).unwrap()
}

fn canvas() -> Canvas {
    Canvas::new(Spread.canvas_size(), Rgba8::WHITE)
}

#[test]
fn writes_land_and_offcanvas_writes_drop() {
    let src = source();
    let mut c = canvas();
    let stats = rasterize(&src, &Spread, &mut c, &NeverCancel, 10).unwrap();
    assert_eq!(stats.written, 9);
    assert_eq!(stats.dropped, 9);
    assert_eq!(
        stats.sparse_bounds,
        Some(PixelBox {
            min_x: 0,
            min_y: 0,
            max_x: 4,
            max_y: 2
        })
    );
    assert_eq!(c.get(4, 2), src.pixel(2, 2));
    assert!(c.is_background(1, 0));
    assert_eq!(c.count_non_background(), 9);
}

#[test]
fn cancel_is_polled_per_cadence() {
    let src = source();
    let polls = Cell::new(0);
    let check = || {
        polls.set(polls.get() + 1);
        false
    };
    rasterize(&src, &Spread, &mut canvas(), &check, 2).unwrap();
    // Rows 0 and 2.
    assert_eq!(polls.get(), 2);

    polls.set(0);
    rasterize(&src, &Spread, &mut canvas(), &check, 0).unwrap();
    assert_eq!(polls.get(), 3);
}

#[test]
fn cancelled_before_start_writes_nothing() {
    let src = source();
    let mut c = canvas();
    assert_eq!(rasterize(&src, &Spread, &mut c, &|| true, 10), Err(Aborted));
    assert_eq!(c.count_non_background(), 0);
}

#[test]
fn cancellation_mid_pass_stops_at_next_poll() {
    let src = source();
    let mut c = canvas();
    let polls = Cell::new(0);
    let check = || {
        polls.set(polls.get() + 1);
        polls.get() > 1
    };
    assert_eq!(rasterize(&src, &Spread, &mut c, &check, 1), Err(Aborted));
    // Only row 0 was scattered.
    assert_eq!(c.count_non_background(), 3);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "assertion `left == right` failed")]
fn source_of_another_size_is_refused() {
    let src = SourceImage::from_pixels(2, 2, 4, vec![Rgba8::WHITE; 4]).unwrap();
    let _ = rasterize(&src, &Spread, &mut canvas(), &NeverCancel, 10);
}
