//! Closed-form optical laws that forward-map source pixels onto a canvas.

use smallvec::SmallVec;

use crate::foundation::core::Rgba8;
use crate::raster::canvas::CanvasSize;
use crate::source::image::{SourceBounds, SourceImage};

pub(crate) mod anamorphic;
pub(crate) mod frame;
pub(crate) mod lens;
pub(crate) mod params;
pub(crate) mod planar;
pub(crate) mod spherical;

/// How an emitted point relates to its neighbours on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Coverage {
    /// Neighbouring samples land on neighbouring pixels; nothing to reconstruct.
    Dense,
    /// A magnified or distorted copy that leaves holes; seeds the gap-fill bounding box.
    Sparse,
}

/// One destination write produced by a strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MappedPoint {
    /// Destination column; may be off-canvas.
    pub dst_x: i64,
    /// Destination row; may be off-canvas.
    pub dst_y: i64,
    /// Colour to write.
    pub colour: Rgba8,
    /// Whether the write takes part in gap filling.
    pub coverage: Coverage,
}

/// Emissions of a single sample: at most an object copy and an image copy.
pub type Emissions = SmallVec<[MappedPoint; 2]>;

/// A pure per-sample mapping, configured for one source size and one set of parameters.
///
/// Implementations hold no mutable state, so one strategy may be shared by concurrent requests.
pub trait TransformStrategy: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Canvas the emissions are expressed in.
    fn canvas_size(&self) -> CanvasSize;

    /// Iteration domain handed to [`TransformStrategy::map`], in sample columns and rows.
    ///
    /// Pixel-for-pixel strategies iterate the source itself.
    fn sample_grid(&self) -> SourceBounds;

    /// Size of the source this strategy was built for. [`TransformStrategy::map`] reads
    /// pixels within it.
    fn source_bounds(&self) -> SourceBounds {
        self.sample_grid()
    }

    /// Map the sample at column `x`, row `y` into zero, one or two canvas writes.
    ///
    /// Degenerate geometry (singular denominators, out-of-domain roots) yields no emission.
    fn map(&self, x: u32, y: u32, source: &SourceImage) -> Emissions;
}

pub use anamorphic::AnamorphicParams;
pub use lens::LensParams;
pub use params::TaskParameters;
pub use planar::PlanarMirrorParams;
pub use spherical::SphericalMirrorParams;
