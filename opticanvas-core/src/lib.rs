//! Opticanvas renders optics diagrams by forward-mapping every pixel of a small source raster
//! through a closed-form optical law onto a larger canvas.
//!
//! # Pipeline overview
//!
//! 1. **Register**: the request becomes the latest for its task key in the [`RequestRegistry`].
//! 2. **Build**: [`TaskParameters`] are validated into a [`TransformStrategy`] (lens, planar
//!    mirror, concave or convex spherical mirror, cylindrical anamorphosis).
//! 3. **Scatter**: [`rasterize`] writes every emission onto a [`Canvas`] filled with a
//!    background sentinel.
//! 4. **Fill**: [`fill_gaps`] interpolates the holes a magnified image leaves behind.
//! 5. **Hand off**: the finished canvas, or [`RenderResult::Cancelled`] if a newer request for
//!    the same key arrived first.
//!
//! Rasterization and gap filling poll for cancellation every [`EngineConfig::poll_every`]
//! rows or slices. A superseded request never returns a canvas.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cancel;
mod foundation;
mod raster;
mod render;
mod source;
mod transform;

pub use cancel::registry::{
    Aborted, CancelCheck, CancellationToken, NeverCancel, RequestId, RequestRegistry,
};
pub use foundation::config::EngineConfig;
pub use foundation::core::{PixelBox, Point, Rgba8, Vec2};
pub use foundation::error::{OpticsError, OpticsResult};
pub use raster::canvas::{Canvas, CanvasSize};
pub use raster::gap_fill::fill_gaps;
pub use raster::scatter::{ScatterStats, rasterize};
pub use render::batch::{RenderJob, RenderThreading};
pub use render::pipeline::{
    PLACEHOLDER_COLOUR, PLACEHOLDER_SIDE, RenderPipeline, RenderResult, placeholder_canvas,
};
pub use source::decode::{decode_source, load_source};
pub use source::image::{SourceBounds, SourceImage};
pub use transform::{
    AnamorphicParams, Coverage, Emissions, LensParams, MappedPoint, PlanarMirrorParams,
    SphericalMirrorParams, TaskParameters, TransformStrategy,
};
