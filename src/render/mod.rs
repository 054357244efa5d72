//! Walk planning and the frame loop.
//!
//! A [`walk::WalkPlan`] fixes every keyframe before rendering starts; [`session::render_walk`]
//! then streams the planned frames into a [`crate::FrameSink`].

/// Frame loop driving a generator into a sink.
pub mod session;
/// Latent walks over a grid of cells.
pub mod walk;
