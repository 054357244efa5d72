//! Interpolation paths through latent space.

/// Circular loops around three anchor latents.
pub mod circular;
/// Cyclic spline paths through keyframes.
pub mod spline;
