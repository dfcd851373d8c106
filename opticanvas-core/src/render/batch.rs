use rayon::prelude::*;

use crate::foundation::error::{OpticsError, OpticsResult};
use crate::render::pipeline::{RenderPipeline, RenderResult};
use crate::source::image::SourceImage;
use crate::transform::params::TaskParameters;

/// One independent request of a batch.
#[derive(Clone, Debug)]
pub struct RenderJob {
    /// Task key the job registers under; jobs sharing a key supersede each other.
    pub task_key: String,
    /// Diagram parameters.
    pub params: TaskParameters,
    /// Source raster.
    pub source: SourceImage,
}

impl RenderJob {
    /// Job keyed by the parameters' kind.
    pub fn new(params: TaskParameters, source: SourceImage) -> Self {
        Self {
            task_key: params.kind().to_owned(),
            params,
            source,
        }
    }
}

/// Worker settings for [`RenderPipeline::render_batch`].
#[derive(Clone, Debug, Default)]
pub struct RenderThreading {
    /// Render jobs concurrently on a dedicated pool.
    pub parallel: bool,
    /// Pool size; `None` lets rayon decide. `Some(0)` is rejected.
    pub threads: Option<usize>,
}

impl RenderThreading {
    /// Reject a pool size of zero.
    pub fn validate(&self) -> OpticsResult<()> {
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(OpticsError::invalid(
                "render threading 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

impl RenderPipeline {
    /// Render `jobs` and return their results in input order.
    ///
    /// Each job is issued a fresh request id under its task key at render time.
    pub fn render_batch(
        &self,
        jobs: &[RenderJob],
        threading: &RenderThreading,
    ) -> OpticsResult<Vec<RenderResult>> {
        threading.validate()?;
        let render_one = |job: &RenderJob| {
            let id = self.issue(&job.task_key);
            self.render(&job.task_key, &job.params, &job.source, id)
        };

        if !threading.parallel || jobs.len() <= 1 {
            return Ok(jobs.iter().map(render_one).collect());
        }

        let pool = build_thread_pool(threading)?;
        tracing::debug!(jobs = jobs.len(), threads = pool.current_num_threads(), "batch render");
        Ok(pool.install(|| jobs.par_iter().map(render_one).collect()))
    }
}

fn build_thread_pool(threading: &RenderThreading) -> OpticsResult<rayon::ThreadPool> {
    threading.validate()?;
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threading.threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| OpticsError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/batch.rs"]
mod tests;
