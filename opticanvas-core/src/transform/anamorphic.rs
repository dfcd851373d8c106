use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::foundation::config::EngineConfig;
use crate::foundation::core::{Point, Rgba8, Vec2};
use crate::foundation::error::{OpticsError, OpticsResult};
use crate::foundation::math::{isqrt, lerp_rgba};
use crate::raster::canvas::CanvasSize;
use crate::source::image::{SourceBounds, SourceImage};
use crate::transform::frame::{ViewFrame, checked_canvas, require_finite};
use crate::transform::{Coverage, Emissions, TransformStrategy};

/// Cylindrical anamorphosis: the source is wrapped onto an annular sector below its own footprint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnamorphicParams {
    /// Radial extent of the sector in multiples of the inner radius.
    pub radius_factor: f64,
    /// Angular extent in degrees, centred straight down.
    pub arc_angle: f64,
}

impl Default for AnamorphicParams {
    fn default() -> Self {
        Self {
            radius_factor: 3.0,
            arc_angle: 160.0,
        }
    }
}

impl AnamorphicParams {
    pub(crate) fn validate(&self) -> OpticsResult<()> {
        require_finite(&[
            ("radius_factor", self.radius_factor),
            ("arc_angle", self.arc_angle),
        ])?;
        if self.radius_factor < 0.0 {
            return Err(OpticsError::invalid(format!(
                "radius_factor must be non-negative, got {}",
                self.radius_factor
            )));
        }
        if self.arc_angle <= 0.0 || self.arc_angle > 360.0 {
            return Err(OpticsError::invalid(format!(
                "arc_angle must be in (0, 360], got {}",
                self.arc_angle
            )));
        }
        Ok(())
    }
}

/// Inner radius of the sector: the integer root of the squared half-diagonal, at least 1.
pub(crate) fn inner_radius(bounds: SourceBounds) -> f64 {
    let hw = f64::from(bounds.width) / 2.0;
    let hh = f64::from(bounds.height) / 2.0;
    isqrt((hw * hw + hh * hh) as u64).max(1) as f64
}

/// Samples the sector itself rather than the source, at no more than half a pixel apart along
/// both the outer arc and the radius, so the warped image needs no reconstruction.
pub(crate) struct AnamorphicStrategy {
    bounds: SourceBounds,
    size: CanvasSize,
    frame: ViewFrame,
    centre: Point,
    inner: f64,
    radial_span: f64,
    start_angle: f64,
    sweep: f64,
    grid: SourceBounds,
}

impl AnamorphicStrategy {
    pub(crate) fn new(
        params: AnamorphicParams,
        bounds: SourceBounds,
        cfg: &EngineConfig,
    ) -> OpticsResult<Self> {
        params.validate()?;
        let inner = inner_radius(bounds);
        let outer = inner * (params.radius_factor + 1.0);
        let half_w = outer.ceil() + 2.0;
        let half_h = (f64::from(bounds.height) / 2.0 + outer).ceil() + 2.0;
        let size = checked_canvas(2.0 * half_w, 2.0 * half_h, cfg)?;

        let sweep = params.arc_angle.to_radians();
        let radial_span = inner * params.radius_factor;
        let columns = (2.0 * sweep * outer).ceil() + 1.0;
        let rows = (2.0 * radial_span).ceil().max(f64::from(bounds.height) - 1.0) + 1.0;
        let limit = f64::from(cfg.max_canvas_side) * 4.0;
        if columns > limit || rows > limit {
            return Err(OpticsError::invalid(format!(
                "anamorphic grid {columns}x{rows} is too dense"
            )));
        }

        Ok(Self {
            bounds,
            size,
            frame: ViewFrame {
                origin_x: half_w,
                origin_y: half_h,
                px_per_unit: 1.0,
            },
            centre: Point::new(0.0, -f64::from(bounds.height) / 2.0),
            inner,
            radial_span,
            start_angle: 1.5 * PI - sweep / 2.0,
            sweep,
            grid: SourceBounds {
                width: columns as u32,
                height: rows as u32,
            },
        })
    }

    fn fraction(i: u32, count: u32) -> f64 {
        if count <= 1 {
            0.0
        } else {
            f64::from(i) / f64::from(count - 1)
        }
    }

    fn sample_row(row: &[Rgba8], s: f64) -> Rgba8 {
        let last = row.len() - 1;
        let i0 = (s.floor() as usize).min(last);
        let i1 = (i0 + 1).min(last);
        lerp_rgba(row[i0], row[i1], s - i0 as f64)
    }
}

impl TransformStrategy for AnamorphicStrategy {
    fn name(&self) -> &'static str {
        "anamorphic"
    }

    fn canvas_size(&self) -> CanvasSize {
        self.size
    }

    fn sample_grid(&self) -> SourceBounds {
        self.grid
    }

    fn source_bounds(&self) -> SourceBounds {
        self.bounds
    }

    fn map(&self, x: u32, y: u32, source: &SourceImage) -> Emissions {
        // Top grid row is the outer arc and reads the top source row.
        let t_row = Self::fraction(y, self.grid.height);
        let t_col = Self::fraction(x, self.grid.width);
        let radius = self.inner + self.radial_span * (1.0 - t_row);
        let src_row = (t_row * f64::from(self.bounds.height - 1)).round() as u32;
        let colour = Self::sample_row(
            source.row(src_row),
            t_col * f64::from(self.bounds.width - 1),
        );

        let theta = self.start_angle + t_col * self.sweep;
        let p = self.centre + radius * Vec2::new(theta.cos(), theta.sin());
        let mut out = SmallVec::new();
        out.extend(self.frame.emit(p, colour, Coverage::Dense));
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/anamorphic.rs"]
mod tests;
