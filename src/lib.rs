//! Latent-walk video rendering for pretrained generative image networks.
//!
//! The public API follows the render pipeline:
//!
//! - Describe the walk with a [`WalkConfig`] (seeds, grid, interpolation)
//! - Load a [`Generator`], e.g. a [`FourierGenerator`] checkpoint
//! - Plan it with [`WalkPlan::build`] and stream frames into a [`FrameSink`], or call
//!   [`render_video`] to do both
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

/// Run configuration and command line parsers.
pub mod config;
/// Encoding sinks.
pub mod encode;
/// Grid compositor.
pub mod grid;
/// Interpolation paths.
pub mod interp;
/// Seed sampling and keyframe expansion.
pub mod latent;
/// Generator seam and the bundled candle network.
pub mod network;
/// Walk planning and the frame loop.
pub mod render;

pub use crate::foundation::core::{Fps, FrameIndex, GridDims, Latent};
pub use crate::foundation::error::{WalkError, WalkResult};

pub use crate::config::{Interpolation, WalkConfig, parse_grid, parse_seed_list};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
pub use crate::grid::{Frame, layout_grid};
pub use crate::interp::circular::CircularLoop;
pub use crate::interp::spline::{SplineKind, SplinePath};
pub use crate::latent::seed::{KeyframeSeeds, expand_keyframes, sample_latent};
pub use crate::network::fourier::{FourierGenerator, FourierGeneratorConfig};
pub use crate::network::{ChwImage, Generator};
pub use crate::render::session::{
    RenderStats, render_frame, render_video, render_walk, stabilize_generator,
};
pub use crate::render::walk::{LatentWalk, WalkPlan};
