//! Seed handling: seed → latent sampling and keyframe expansion over a grid.

/// Seed sampling and keyframe expansion.
pub mod seed;
