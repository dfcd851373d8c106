use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::foundation::config::EngineConfig;
use crate::foundation::error::{OpticsError, OpticsResult};
use crate::raster::canvas::CanvasSize;
use crate::source::image::{SourceBounds, SourceImage};
use crate::transform::frame::checked_canvas;
use crate::transform::{Coverage, Emissions, MappedPoint, TransformStrategy};

/// Flat mirror along the vertical centre line of a square canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanarMirrorParams {
    /// Columns between the mirror and the object's nearest column.
    pub offset_x: i64,
    /// Rows the object is raised above the centre line.
    pub offset_y: i64,
    /// Side of the square canvas in pixels.
    pub canvas_size: u32,
}

impl Default for PlanarMirrorParams {
    fn default() -> Self {
        Self {
            offset_x: 20,
            offset_y: 0,
            canvas_size: 400,
        }
    }
}

pub(crate) struct PlanarStrategy {
    params: PlanarMirrorParams,
    bounds: SourceBounds,
    size: CanvasSize,
}

impl PlanarStrategy {
    pub(crate) fn new(
        params: PlanarMirrorParams,
        bounds: SourceBounds,
        cfg: &EngineConfig,
    ) -> OpticsResult<Self> {
        if params.canvas_size == 0 {
            return Err(OpticsError::invalid("canvas_size must be at least 1"));
        }
        let side = f64::from(params.canvas_size);
        let size = checked_canvas(side, side, cfg)?;
        Ok(Self {
            params,
            bounds,
            size,
        })
    }

    fn axis(&self) -> i64 {
        i64::from(self.params.canvas_size / 2)
    }
}

impl TransformStrategy for PlanarStrategy {
    fn name(&self) -> &'static str {
        "planar_mirror"
    }

    fn canvas_size(&self) -> CanvasSize {
        self.size
    }

    fn sample_grid(&self) -> SourceBounds {
        self.bounds
    }

    fn map(&self, x: u32, y: u32, source: &SourceImage) -> Emissions {
        let colour = source.pixel(x, y);
        let axis = self.axis();
        // Offsets are unbounded; a coordinate that does not fit in i64 is off any canvas.
        let Some(dx) = self.params.offset_x.checked_add(i64::from(x)) else {
            return Emissions::new();
        };
        let Some(row) = axis
            .checked_sub(self.params.offset_y)
            .and_then(|r| r.checked_sub(i64::from(self.bounds.height / 2)))
            .and_then(|r| r.checked_add(i64::from(y)))
        else {
            return Emissions::new();
        };
        let at = |dst_x: i64| MappedPoint {
            dst_x,
            dst_y: row,
            colour,
            coverage: Coverage::Dense,
        };
        match (axis.checked_add(dx), (axis - 1).checked_sub(dx)) {
            (Some(object), Some(image)) => SmallVec::from_buf([at(object), at(image)]),
            (object, image) => object.into_iter().chain(image).map(at).collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/planar.rs"]
mod tests;
