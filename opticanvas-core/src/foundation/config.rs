use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{OpticsError, OpticsResult};

/// Engine-wide knobs shared by every request handled by a [`crate::RenderPipeline`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Cancellation is polled once every this many source rows / gap-fill slices.
    pub poll_every: usize,
    /// Largest canvas side a strategy may request.
    pub max_canvas_side: u32,
    /// Longest side a loaded source image is downsized to.
    pub max_source_side: u32,
    /// Sentinel colour meaning "not yet written".
    pub background: Rgba8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_every: 10,
            max_canvas_side: 8192,
            max_source_side: 400,
            background: Rgba8::WHITE,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) config from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> OpticsResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| OpticsError::invalid(format!("engine config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: &Path) -> OpticsResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read engine config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Reject configs that cannot produce a canvas.
    pub fn validate(&self) -> OpticsResult<()> {
        if self.max_canvas_side == 0 {
            return Err(OpticsError::invalid("max_canvas_side must be >= 1"));
        }
        if self.max_source_side == 0 {
            return Err(OpticsError::invalid("max_source_side must be >= 1"));
        }
        Ok(())
    }

    /// Poll cadence with `0` normalized to "every row".
    pub fn poll_cadence(&self) -> usize {
        self.poll_every.max(1)
    }
}
