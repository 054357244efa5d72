//! Network seam: the render core only talks to [`Generator`].

/// Fourier-feature generator evaluated with candle.
pub mod fourier;

use crate::foundation::core::Latent;
use crate::foundation::error::{WalkError, WalkResult};

/// A planar `[channels, height, width]` image in the network's native float range.
#[derive(Clone, Debug, PartialEq)]
pub struct ChwImage {
    /// Channel count.
    pub channels: usize,
    /// Height in pixels.
    pub height: usize,
    /// Width in pixels.
    pub width: usize,
    /// `channels * height * width` values, channel-major.
    pub data: Vec<f32>,
}

impl ChwImage {
    /// Wrap `data`, checking its length against the shape.
    pub fn new(channels: usize, height: usize, width: usize, data: Vec<f32>) -> WalkResult<Self> {
        if data.len() != channels * height * width {
            return Err(WalkError::runtime(format!(
                "image data has {} values, expected {channels}x{height}x{width}",
                data.len()
            )));
        }
        Ok(Self {
            channels,
            height,
            width,
            data,
        })
    }

    /// `(channels, height, width)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.channels, self.height, self.width)
    }
}

/// A pretrained generative network split into mapping and synthesis stages.
///
/// Walks are built in the mapped space: keyframes go through [`Generator::map`] once, and each
/// frame's interpolated latent goes through [`Generator::synthesize`].
pub trait Generator {
    /// Width of the input latent consumed by [`Generator::map`].
    fn z_dim(&self) -> usize;

    /// Map an input latent into the synthesis space, applying truncation `psi`.
    ///
    /// `psi == 1.0` must leave the mapped latent untouched.
    fn map(&self, z: &Latent, truncation_psi: f32) -> WalkResult<Latent>;

    /// Render one image from a mapped latent.
    fn synthesize(&self, w: &Latent) -> WalkResult<ChwImage>;

    /// Anchor the affine input stage to the mean latent.
    ///
    /// Returns `false` when the network has no such stage. Calling it again after a successful
    /// stabilization is a no-op.
    fn stabilize_input(&mut self) -> WalkResult<bool> {
        Ok(false)
    }
}
