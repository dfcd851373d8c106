use std::sync::Arc;

use crate::cancel::registry::{
    Aborted, CancelCheck, CancellationToken, RequestId, RequestRegistry,
};
use crate::foundation::config::EngineConfig;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{OpticsError, OpticsResult};
use crate::raster::canvas::{Canvas, CanvasSize};
use crate::raster::gap_fill::fill_gaps;
use crate::raster::scatter::rasterize;
use crate::source::image::SourceImage;
use crate::transform::TransformStrategy;
use crate::transform::params::TaskParameters;

/// Side of the neutral canvas shown in place of cancelled or failed requests.
pub const PLACEHOLDER_SIDE: u32 = 64;

/// Fill colour of the placeholder canvas.
pub const PLACEHOLDER_COLOUR: Rgba8 = Rgba8::new(211, 211, 211, 255);

/// Outcome of one request.
#[derive(Debug)]
pub enum RenderResult {
    /// The finished, gap-filled canvas.
    Canvas(Canvas),
    /// A newer request for the same task key arrived first.
    Cancelled,
    /// The request could not be rendered at all.
    Error(OpticsError),
}

impl RenderResult {
    /// Finished canvas, if any.
    pub fn canvas(&self) -> Option<&Canvas> {
        match self {
            Self::Canvas(c) => Some(c),
            _ => None,
        }
    }

    /// Whether the request was superseded.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Short label for logs and CLI output.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Canvas(_) => "canvas",
            Self::Cancelled => "cancelled",
            Self::Error(_) => "error",
        }
    }

    /// The canvas, or the same neutral placeholder for both cancellation and failure.
    pub fn into_canvas_or_placeholder(self, cfg: &EngineConfig) -> Canvas {
        match self {
            Self::Canvas(c) => c,
            Self::Cancelled | Self::Error(_) => placeholder_canvas(cfg),
        }
    }
}

/// Uniform light grey canvas, never containing partially rendered content.
pub fn placeholder_canvas(cfg: &EngineConfig) -> Canvas {
    let mut canvas = Canvas::new(
        CanvasSize {
            width: PLACEHOLDER_SIDE,
            height: PLACEHOLDER_SIDE,
        },
        cfg.background,
    );
    for y in 0..PLACEHOLDER_SIDE {
        for x in 0..PLACEHOLDER_SIDE {
            canvas.set(x, y, PLACEHOLDER_COLOUR);
        }
    }
    canvas
}

/// Per-request orchestration: register, scatter, fill, hand off.
///
/// One pipeline is shared by every request of a process; the only state it holds across
/// requests is the [`RequestRegistry`].
#[derive(Debug)]
pub struct RenderPipeline {
    config: EngineConfig,
    registry: Arc<RequestRegistry>,
}

impl RenderPipeline {
    /// Pipeline with a fresh registry.
    pub fn new(config: EngineConfig) -> OpticsResult<Self> {
        Self::with_registry(config, Arc::new(RequestRegistry::new()))
    }

    /// Pipeline sharing an existing registry.
    pub fn with_registry(config: EngineConfig, registry: Arc<RequestRegistry>) -> OpticsResult<Self> {
        config.validate()?;
        Ok(Self { config, registry })
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registry deciding which request is the latest per task key.
    pub fn registry(&self) -> &Arc<RequestRegistry> {
        &self.registry
    }

    /// Mint a fresh request id and register it as the latest for `task_key`.
    pub fn issue(&self, task_key: &str) -> RequestId {
        self.registry.issue(task_key)
    }

    /// Register `request_id` as the latest for `task_key`, then render.
    ///
    /// Returns [`RenderResult::Cancelled`] if another request for `task_key` is registered
    /// before this one finishes.
    #[tracing::instrument(
        level = "debug",
        skip(self, params, source, request_id),
        fields(kind = params.kind(), request_id = request_id.as_u64())
    )]
    pub fn render(
        &self,
        task_key: &str,
        params: &TaskParameters,
        source: &SourceImage,
        request_id: RequestId,
    ) -> RenderResult {
        self.registry.register(task_key, request_id);
        let token = CancellationToken::new(Arc::clone(&self.registry), task_key, request_id);
        self.render_with(&token, params, source)
    }

    /// Render with a freshly issued id under the parameters' own kind as task key.
    pub fn submit(&self, params: &TaskParameters, source: &SourceImage) -> RenderResult {
        let task_key = params.kind();
        let id = self.issue(task_key);
        self.render(task_key, params, source, id)
    }

    /// Render against an arbitrary cancellation check, without touching the registry.
    pub fn render_with(
        &self,
        cancel: &dyn CancelCheck,
        params: &TaskParameters,
        source: &SourceImage,
    ) -> RenderResult {
        let strategy = match params.strategy(source.bounds(), &self.config) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(kind = params.kind(), error = %e, "render failed");
                return RenderResult::Error(e);
            }
        };
        match self.run(cancel, strategy.as_ref(), source) {
            Ok(canvas) => RenderResult::Canvas(canvas),
            Err(Aborted) => {
                tracing::debug!(strategy = strategy.name(), "render superseded");
                RenderResult::Cancelled
            }
        }
    }

    fn run(
        &self,
        cancel: &dyn CancelCheck,
        strategy: &dyn TransformStrategy,
        source: &SourceImage,
    ) -> Result<Canvas, Aborted> {
        let poll_every = self.config.poll_cadence();
        cancel.check()?;
        let mut canvas = Canvas::new(strategy.canvas_size(), self.config.background);
        let stats = rasterize(source, strategy, &mut canvas, cancel, poll_every)?;
        let filled = match stats.sparse_bounds {
            Some(bounds) => fill_gaps(&mut canvas, bounds, cancel, poll_every)?,
            None => 0,
        };
        // A request superseded after its last poll must still not hand off its canvas.
        cancel.check()?;
        tracing::debug!(
            strategy = strategy.name(),
            width = canvas.width(),
            height = canvas.height(),
            written = stats.written,
            dropped = stats.dropped,
            filled,
            "render done"
        );
        Ok(canvas)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
