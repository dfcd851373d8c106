use crate::foundation::config::EngineConfig;
use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{OpticsError, OpticsResult};
use crate::foundation::math::floor_cell;
use crate::raster::canvas::CanvasSize;
use crate::transform::{Coverage, MappedPoint};

/// Affine map from optical world coordinates (y up) to canvas pixels (y down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ViewFrame {
    /// Canvas column of world `x = 0`.
    pub(crate) origin_x: f64,
    /// Canvas row of world `y = 0`.
    pub(crate) origin_y: f64,
    pub(crate) px_per_unit: f64,
}

impl ViewFrame {
    /// World origin at the centre of `size`, one pixel per unit.
    pub(crate) fn centered(size: CanvasSize) -> Self {
        Self {
            origin_x: f64::from(size.width) / 2.0,
            origin_y: f64::from(size.height) / 2.0,
            px_per_unit: 1.0,
        }
    }

    pub(crate) fn to_cell(self, p: Point) -> Option<(i64, i64)> {
        let x = floor_cell(self.origin_x + p.x * self.px_per_unit)?;
        let y = floor_cell(self.origin_y - p.y * self.px_per_unit)?;
        Some((x, y))
    }

    pub(crate) fn emit(self, p: Point, colour: Rgba8, coverage: Coverage) -> Option<MappedPoint> {
        let (dst_x, dst_y) = self.to_cell(p)?;
        Some(MappedPoint {
            dst_x,
            dst_y,
            colour,
            coverage,
        })
    }
}

/// Round a requested canvas extent up to whole pixels and enforce the configured limit.
pub(crate) fn checked_canvas(
    width: f64,
    height: f64,
    cfg: &EngineConfig,
) -> OpticsResult<CanvasSize> {
    let limit = f64::from(cfg.max_canvas_side);
    let side = |v: f64, axis: &str| -> OpticsResult<u32> {
        let v = v.ceil().max(1.0);
        if !v.is_finite() || v > limit {
            return Err(OpticsError::invalid(format!(
                "canvas {axis} {v} exceeds max_canvas_side {limit}"
            )));
        }
        Ok(v as u32)
    };
    Ok(CanvasSize {
        width: side(width, "width")?,
        height: side(height, "height")?,
    })
}

/// Reject non-finite parameter values by name.
pub(crate) fn require_finite(fields: &[(&str, f64)]) -> OpticsResult<()> {
    for (name, v) in fields {
        if !v.is_finite() {
            return Err(OpticsError::invalid(format!("{name} must be finite, got {v}")));
        }
    }
    Ok(())
}
