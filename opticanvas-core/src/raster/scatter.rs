use crate::cancel::registry::{Aborted, CancelCheck};
use crate::foundation::core::PixelBox;
use crate::raster::canvas::Canvas;
use crate::source::image::SourceImage;
use crate::transform::{Coverage, TransformStrategy};

/// Counters from one scatter pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScatterStats {
    /// Emissions that landed on the canvas.
    pub written: usize,
    /// Emissions dropped for falling off the canvas.
    pub dropped: usize,
    /// Bounding box of on-canvas sparse writes; `None` when there were none.
    pub sparse_bounds: Option<PixelBox>,
}

/// Walk the strategy's sample grid row-major and write every emission onto `canvas`.
///
/// Cancellation is polled before the first row and then every `poll_every` rows. Later writes
/// to the same pixel overwrite earlier ones.
///
/// `source` must have the size the strategy was built for (`strategy.source_bounds()`) and
/// `canvas` the strategy's canvas size; strategies index the source without further checks.
pub fn rasterize(
    source: &SourceImage,
    strategy: &dyn TransformStrategy,
    canvas: &mut Canvas,
    cancel: &dyn CancelCheck,
    poll_every: usize,
) -> Result<ScatterStats, Aborted> {
    debug_assert_eq!(canvas.size(), strategy.canvas_size());
    debug_assert_eq!(source.bounds(), strategy.source_bounds());
    let poll_every = poll_every.max(1);
    let grid = strategy.sample_grid();
    let mut stats = ScatterStats::default();

    for y in 0..grid.height {
        if (y as usize) % poll_every == 0 {
            cancel.check()?;
        }
        for x in 0..grid.width {
            for p in strategy.map(x, y, source) {
                let Some((cx, cy)) = canvas.put(p.dst_x, p.dst_y, p.colour) else {
                    stats.dropped += 1;
                    continue;
                };
                stats.written += 1;
                if p.coverage == Coverage::Sparse {
                    match stats.sparse_bounds.as_mut() {
                        Some(b) => b.include(cx, cy),
                        None => stats.sparse_bounds = Some(PixelBox::point(cx, cy)),
                    }
                }
            }
        }
    }

    tracing::trace!(
        strategy = strategy.name(),
        written = stats.written,
        dropped = stats.dropped,
        "scatter done"
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/scatter.rs"]
mod tests;
