use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::config::EngineConfig;
use crate::foundation::error::{OpticsError, OpticsResult};
use crate::source::image::SourceBounds;
use crate::transform::TransformStrategy;
use crate::transform::anamorphic::{AnamorphicParams, AnamorphicStrategy};
use crate::transform::lens::{LensParams, LensStrategy};
use crate::transform::planar::{PlanarMirrorParams, PlanarStrategy};
use crate::transform::spherical::{MirrorFace, SphericalMirrorParams, SphericalStrategy};

/// Parameters of one request, tagged by diagram kind.
///
/// ```json
/// { "kind": "lens", "start_x": 200.0, "focal_length": 120.0 }
/// ```
///
/// Omitted fields take the per-diagram defaults, except spherical mirrors, whose placement is
/// required (only `zoom` may be omitted).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskParameters {
    /// Thin lens.
    Lens(LensParams),
    /// Flat mirror.
    PlanarMirror(PlanarMirrorParams),
    /// Concave spherical mirror.
    ConcaveMirror(SphericalMirrorParams),
    /// Convex spherical mirror.
    ConvexMirror(SphericalMirrorParams),
    /// Cylindrical anamorphosis.
    Anamorphic(AnamorphicParams),
}

impl TaskParameters {
    /// Parse from a JSON document.
    pub fn from_json_str(s: &str) -> OpticsResult<Self> {
        serde_json::from_str(s).map_err(|e| OpticsError::invalid(e.to_string()))
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: &Path) -> OpticsResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read parameters {}", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Serialize back to JSON.
    pub fn to_json_string(&self) -> OpticsResult<String> {
        serde_json::to_string(self).map_err(|e| OpticsError::Other(e.into()))
    }

    /// Diagram kind tag, also the default task key for request registration.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Lens(_) => "lens",
            Self::PlanarMirror(_) => "planar_mirror",
            Self::ConcaveMirror(_) => "concave_mirror",
            Self::ConvexMirror(_) => "convex_mirror",
            Self::Anamorphic(_) => "anamorphic",
        }
    }

    /// Validate the parameters against `bounds` and build the matching strategy.
    pub fn strategy(
        &self,
        bounds: SourceBounds,
        cfg: &EngineConfig,
    ) -> OpticsResult<Box<dyn TransformStrategy>> {
        Ok(match *self {
            Self::Lens(p) => Box::new(LensStrategy::new(p, bounds, cfg)?),
            Self::PlanarMirror(p) => Box::new(PlanarStrategy::new(p, bounds, cfg)?),
            Self::ConcaveMirror(p) => Box::new(SphericalStrategy::new(
                MirrorFace::Concave,
                p,
                bounds,
                cfg,
            )?),
            Self::ConvexMirror(p) => Box::new(SphericalStrategy::new(
                MirrorFace::Convex,
                p,
                bounds,
                cfg,
            )?),
            Self::Anamorphic(p) => Box::new(AnamorphicStrategy::new(p, bounds, cfg)?),
        })
    }

    /// Copy with one numeric field replaced, addressed by its JSON name.
    ///
    /// Integer fields accept only integral values.
    pub fn with_field(&self, field: &str, value: f64) -> OpticsResult<Self> {
        let mut doc = serde_json::to_value(self).map_err(|e| OpticsError::Other(e.into()))?;
        let slot = doc
            .as_object_mut()
            .filter(|_| field != "kind")
            .and_then(|obj| obj.get_mut(field))
            .ok_or_else(|| {
                OpticsError::invalid(format!("{} has no field `{field}`", self.kind()))
            })?;
        *slot = if slot.is_f64() {
            serde_json::Number::from_f64(value)
                .map(serde_json::Value::Number)
                .ok_or_else(|| OpticsError::invalid(format!("`{field}` must be finite")))?
        } else if value.fract() == 0.0 && value.abs() < 9.0e15 {
            serde_json::Value::from(value as i64)
        } else {
            return Err(OpticsError::invalid(format!(
                "`{field}` is an integer, got {value}"
            )));
        };
        serde_json::from_value(doc).map_err(|e| OpticsError::invalid(e.to_string()))
    }
}

impl Default for TaskParameters {
    fn default() -> Self {
        Self::Lens(LensParams::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/params.rs"]
mod tests;
