//! Grid compositor: tiles per-cell network images into one 8-bit frame.

use crate::foundation::core::GridDims;
use crate::foundation::error::{WalkError, WalkResult};
use crate::network::ChwImage;

/// One output frame, 8 bits per channel, channel-last and row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Interleaved channels per pixel.
    pub channels: u32,
    /// `height * width * channels` bytes.
    pub data: Vec<u8>,
}

impl Frame {
    /// Channel values of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.channels as usize;
        let start = (y as usize * self.width as usize + x as usize) * c;
        &self.data[start..start + c]
    }
}

/// Map a value in the network's nominal `[-1, 1]` range to `[0, 255]`.
///
/// Truncates after clamping, so `-1.0` maps to 0 and `1.0` to 255.
pub fn float_to_u8(v: f32) -> u8 {
    (v * 127.5 + 128.0).clamp(0.0, 255.0) as u8
}

/// Tile `images` (row-major by grid row, then column) into a single frame.
///
/// All images must share one `[channels, height, width]` shape; the result is
/// `[grid.height * height, grid.width * width, channels]`.
pub fn layout_grid(images: &[ChwImage], grid: GridDims) -> WalkResult<Frame> {
    if images.len() != grid.cells() {
        return Err(WalkError::runtime(format!(
            "grid {}x{} needs {} images, got {}",
            grid.width,
            grid.height,
            grid.cells(),
            images.len()
        )));
    }
    let Some(first) = images.first() else {
        return Err(WalkError::runtime("grid layout needs at least one image"));
    };
    let (ch, h, w) = first.shape();
    if let Some(bad) = images.iter().find(|img| img.shape() != (ch, h, w)) {
        return Err(WalkError::runtime(format!(
            "grid images must share one shape: {:?} vs {:?}",
            bad.shape(),
            (ch, h, w)
        )));
    }

    let gw = grid.width as usize;
    let out_w = gw * w;
    let out_h = grid.height as usize * h;
    let mut data = vec![0u8; out_h * out_w * ch];

    for (cell, img) in images.iter().enumerate() {
        let (yi, xi) = (cell / gw, cell % gw);
        for y in 0..h {
            let row = (yi * h + y) * out_w + xi * w;
            for x in 0..w {
                let dst = (row + x) * ch;
                for k in 0..ch {
                    data[dst + k] = float_to_u8(img.data[(k * h + y) * w + x]);
                }
            }
        }
    }

    Ok(Frame {
        width: out_w as u32,
        height: out_h as u32,
        channels: ch as u32,
        data,
    })
}

#[cfg(test)]
#[path = "../tests/unit/grid.rs"]
mod tests;
