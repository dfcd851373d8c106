use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::foundation::config::EngineConfig;
use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{OpticsError, OpticsResult};
use crate::foundation::math::near_zero;
use crate::raster::canvas::CanvasSize;
use crate::source::image::{SourceBounds, SourceImage};
use crate::transform::frame::{ViewFrame, checked_canvas, require_finite};
use crate::transform::{Coverage, Emissions, TransformStrategy};

/// Object placement for a spherical mirror of radius `radius` centred at the world origin.
///
/// The object is a rectangle of height `object_height` whose width follows the source's aspect
/// ratio; each source pixel is sampled at its centre.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SphericalMirrorParams {
    /// Radius of curvature.
    pub radius: f64,
    /// World x of the object's left edge.
    pub object_x: f64,
    /// World y of the object's vertical centre.
    pub object_y: f64,
    /// World height of the object.
    pub object_height: f64,
    /// Multiplier on the pixels-per-unit ratio; 1 keeps one source pixel per canvas pixel.
    #[serde(default = "unit_zoom")]
    pub zoom: f64,
}

impl SphericalMirrorParams {
    /// Defaults placing the object just beyond the centre of a concave mirror.
    pub fn concave_default() -> Self {
        Self {
            radius: 1.0,
            object_x: 0.2,
            object_y: 0.15,
            object_height: 0.3,
            zoom: 1.0,
        }
    }

    /// Defaults placing the object outside a convex mirror.
    pub fn convex_default() -> Self {
        Self {
            radius: 1.0,
            object_x: 1.5,
            object_y: 0.0,
            object_height: 0.5,
            zoom: 1.0,
        }
    }

    pub(crate) fn validate(&self) -> OpticsResult<()> {
        require_finite(&[
            ("radius", self.radius),
            ("object_x", self.object_x),
            ("object_y", self.object_y),
            ("object_height", self.object_height),
            ("zoom", self.zoom),
        ])?;
        for (name, v) in [
            ("radius", self.radius),
            ("object_height", self.object_height),
            ("zoom", self.zoom),
        ] {
            if v <= 0.0 {
                return Err(OpticsError::invalid(format!(
                    "{name} must be positive, got {v}"
                )));
            }
        }
        Ok(())
    }
}

fn unit_zoom() -> f64 {
    1.0
}

/// Which face of the sphere reflects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MirrorFace {
    Concave,
    Convex,
}

/// Image of `p` in a concave mirror whose reflecting arc is the left half of the circle.
///
/// A ray parallel to the axis leaves `p`, reflects at the mirror point of equal height, and the
/// image is where it meets the ray from `p` through the centre.
pub(crate) fn concave_image(p: Point, radius: f64) -> Option<Point> {
    if near_zero(p.x) && near_zero(p.y) {
        return Some(Point::ORIGIN);
    }
    if near_zero(p.y) {
        let den = radius + 2.0 * p.x;
        if near_zero(den) {
            return None;
        }
        return Some(Point::new(-p.x * radius / den, 0.0));
    }
    if p.y.abs() > radius {
        return None;
    }
    let m = Point::new(-(radius * radius - p.y * p.y).max(0.0).sqrt(), p.y);
    let normal = m.to_vec2() / radius;
    let incident = Vec2::new(-1.0, 0.0);
    let reflected = incident - normal * (2.0 * incident.dot(normal));
    let den = reflected.x * p.y - reflected.y * p.x;
    if near_zero(den) {
        return None;
    }
    let t = (p.x * m.y - p.y * m.x) / den;
    Some(m + reflected * t)
}

/// Image of `p` in a convex mirror whose reflecting arc is the right half of the circle.
///
/// Only objects beyond the vertex (`p.x > radius`) form an image.
pub(crate) fn convex_image(p: Point, radius: f64) -> Option<Point> {
    if p.x <= radius {
        return None;
    }
    if near_zero(p.y) {
        let den = 2.0 * p.x - radius;
        if near_zero(den) {
            return None;
        }
        return Some(Point::new(p.x * radius / den, 0.0));
    }
    if p.y.abs() > radius {
        return None;
    }
    let x_m = (radius * radius - p.y * p.y).max(0.0).sqrt();
    let den = 2.0 * x_m - radius - 2.0 * p.x;
    if near_zero(den) {
        return None;
    }
    let k = -radius / den;
    Some(Point::new(p.x * k, p.y * k))
}

pub(crate) struct SphericalStrategy {
    face: MirrorFace,
    params: SphericalMirrorParams,
    bounds: SourceBounds,
    size: CanvasSize,
    frame: ViewFrame,
    /// World size of one source pixel.
    pitch: f64,
}

impl SphericalStrategy {
    pub(crate) fn new(
        face: MirrorFace,
        params: SphericalMirrorParams,
        bounds: SourceBounds,
        cfg: &EngineConfig,
    ) -> OpticsResult<Self> {
        params.validate()?;
        let pitch = params.object_height / f64::from(bounds.height);
        let object_w = pitch * f64::from(bounds.width);
        let reach = params.radius * 1.1;
        let half_h = params.object_height / 2.0;
        let x_min = (-reach).min(params.object_x);
        let x_max = reach.max(params.object_x + object_w);
        let y_min = (-reach).min(params.object_y - half_h);
        let y_max = reach.max(params.object_y + half_h);

        let px_per_unit = params.zoom / pitch;
        let size = checked_canvas(
            (x_max - x_min) * px_per_unit,
            (y_max - y_min) * px_per_unit,
            cfg,
        )?;
        let frame = ViewFrame {
            origin_x: -x_min * px_per_unit,
            origin_y: y_max * px_per_unit,
            px_per_unit,
        };
        Ok(Self {
            face,
            params,
            bounds,
            size,
            frame,
            pitch,
        })
    }

    fn object_point(&self, x: u32, y: u32) -> Point {
        Point::new(
            self.params.object_x + (f64::from(x) + 0.5) * self.pitch,
            self.params.object_y + self.params.object_height / 2.0
                - (f64::from(y) + 0.5) * self.pitch,
        )
    }
}

impl TransformStrategy for SphericalStrategy {
    fn name(&self) -> &'static str {
        match self.face {
            MirrorFace::Concave => "concave_mirror",
            MirrorFace::Convex => "convex_mirror",
        }
    }

    fn canvas_size(&self) -> CanvasSize {
        self.size
    }

    fn sample_grid(&self) -> SourceBounds {
        self.bounds
    }

    fn map(&self, x: u32, y: u32, source: &SourceImage) -> Emissions {
        let colour = source.pixel(x, y);
        let p = self.object_point(x, y);
        let image = match self.face {
            MirrorFace::Concave => concave_image(p, self.params.radius),
            MirrorFace::Convex => convex_image(p, self.params.radius),
        };

        let mut out = SmallVec::new();
        out.extend(self.frame.emit(p, colour, Coverage::Dense));
        if let Some(q) = image {
            out.extend(self.frame.emit(q, colour, Coverage::Sparse));
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/spherical.rs"]
mod tests;
