use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::foundation::config::EngineConfig;
use crate::foundation::core::Point;
use crate::foundation::error::{OpticsError, OpticsResult};
use crate::foundation::math::near_zero;
use crate::raster::canvas::CanvasSize;
use crate::source::image::{SourceBounds, SourceImage};
use crate::transform::frame::{ViewFrame, checked_canvas, require_finite};
use crate::transform::{Coverage, Emissions, TransformStrategy};

/// Thin converging or diverging lens at the world origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LensParams {
    /// Distance from the lens to the object's nearest column.
    pub start_x: f64,
    /// Vertical offset of the object's centre above the optical axis.
    pub start_y: f64,
    /// Growth factor for the canvas heuristic; must be positive.
    pub scale: f64,
    /// Focal length; negative for a diverging lens.
    pub focal_length: f64,
}

impl Default for LensParams {
    fn default() -> Self {
        Self {
            start_x: 200.0,
            start_y: 0.0,
            scale: 2.0,
            focal_length: 120.0,
        }
    }
}

impl LensParams {
    pub(crate) fn validate(&self) -> OpticsResult<()> {
        require_finite(&[
            ("start_x", self.start_x),
            ("start_y", self.start_y),
            ("scale", self.scale),
            ("focal_length", self.focal_length),
        ])?;
        if self.scale <= 0.0 {
            return Err(OpticsError::invalid(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Image distance and lateral magnification for an object at distance `u`, or `None` when
/// the object sits at the focal point, the focal length vanishes, or `u` vanishes.
pub(crate) fn thin_lens(u: f64, f: f64) -> Option<(f64, f64)> {
    if near_zero(u - f) || near_zero(f) || near_zero(u) {
        return None;
    }
    let v = u * f / (u - f);
    Some((v, -v / u))
}

pub(crate) struct LensStrategy {
    params: LensParams,
    bounds: SourceBounds,
    size: CanvasSize,
    frame: ViewFrame,
}

impl LensStrategy {
    pub(crate) fn new(
        params: LensParams,
        bounds: SourceBounds,
        cfg: &EngineConfig,
    ) -> OpticsResult<Self> {
        params.validate()?;
        let diag = f64::from(bounds.width).hypot(f64::from(bounds.height));
        let side = (diag * params.scale)
            .max(4.0 * params.focal_length.abs())
            .max(2.0 * params.start_x.abs())
            * 1.5;
        let size = checked_canvas((side * 1.2).max(100.0), side.max(100.0), cfg)?;
        Ok(Self {
            params,
            bounds,
            size,
            frame: ViewFrame::centered(size),
        })
    }
}

impl TransformStrategy for LensStrategy {
    fn name(&self) -> &'static str {
        "lens"
    }

    fn canvas_size(&self) -> CanvasSize {
        self.size
    }

    fn sample_grid(&self) -> SourceBounds {
        self.bounds
    }

    fn map(&self, x: u32, y: u32, source: &SourceImage) -> Emissions {
        let colour = source.pixel(x, y);
        let u = self.params.start_x + f64::from(x);
        let y_o =
            self.params.start_y + f64::from(self.bounds.height) / 2.0 - (f64::from(y) + 0.5);

        let mut out = SmallVec::new();
        out.extend(
            self.frame
                .emit(Point::new(-u, y_o), colour, Coverage::Dense),
        );
        if let Some((v, m)) = thin_lens(u, self.params.focal_length) {
            out.extend(
                self.frame
                    .emit(Point::new(v, y_o * m), colour, Coverage::Sparse),
            );
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/lens.rs"]
mod tests;
