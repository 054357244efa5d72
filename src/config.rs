//! Run configuration and the string parsers behind the command line.

use serde::{Deserialize, Serialize};

use crate::foundation::core::GridDims;
use crate::foundation::error::{WalkError, WalkResult};
use crate::interp::spline::SplineKind;

/// Upper bound on `wraps`; two already keep the loop point clear of the spline ends.
pub const MAX_WRAPS: usize = 64;

/// Upper bound on keyframes per grid cell.
pub const MAX_KEYFRAMES: usize = 1 << 16;

/// How latents travel between seeds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Spline through cyclic keyframes, one walk per grid cell.
    #[default]
    Lerp,
    /// Circle through the plane spanned by three anchor seeds, single walk.
    CircularLoop,
}

/// Everything needed to plan and render one walk video.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Input seeds, in order.
    pub seeds: Vec<u32>,
    /// Interpolation mode.
    pub interpolation: Interpolation,
    /// Seed for permuting the expanded keyframe seeds.
    pub shuffle_seed: Option<u64>,
    /// Grid of simultaneous walks (lerp mode only).
    pub grid: GridDims,
    /// Keyframes per cell; derived from the seed count when absent.
    pub num_keyframes: Option<usize>,
    /// Frames rendered per keyframe interval.
    pub w_frames: u32,
    /// Interpolant used between keyframes.
    pub kind: SplineKind,
    /// Cyclic copies of the keyframes on each side of the timeline.
    pub wraps: usize,
    /// Loop diameter in latent units (circular mode).
    pub diameter: f32,
    /// Truncation psi forwarded to the network's mapping stage.
    pub truncation_psi: f32,
    /// Anchor the network's input stage to the mean latent before rendering.
    pub stabilize: bool,
}

impl WalkConfig {
    /// Default settings for the given seeds.
    pub fn new(seeds: Vec<u32>) -> Self {
        Self {
            seeds,
            interpolation: Interpolation::Lerp,
            shuffle_seed: None,
            grid: GridDims::SINGLE,
            num_keyframes: None,
            w_frames: 120,
            kind: SplineKind::Cubic,
            wraps: 2,
            diameter: 100.0,
            truncation_psi: 1.0,
            stabilize: false,
        }
    }

    /// Check settings that do not depend on the network.
    pub fn validate(&self) -> WalkResult<()> {
        if self.seeds.is_empty() {
            return Err(WalkError::configuration("at least one seed is required"));
        }
        GridDims::new(self.grid.width, self.grid.height)?;
        if self.w_frames == 0 {
            return Err(WalkError::configuration("w_frames must be non-zero"));
        }
        if !self.truncation_psi.is_finite() {
            return Err(WalkError::configuration("truncation psi must be finite"));
        }
        match self.interpolation {
            Interpolation::Lerp => {
                if self.wraps == 0 {
                    return Err(WalkError::configuration(
                        "wraps must be at least 1 so the loop point stays inside the spline",
                    ));
                }
                if self.wraps > MAX_WRAPS {
                    return Err(WalkError::configuration(format!(
                        "wraps must be at most {MAX_WRAPS}, got {}",
                        self.wraps
                    )));
                }
                match self.num_keyframes {
                    Some(0) => {
                        return Err(WalkError::configuration(
                            "number of keyframes must be non-zero",
                        ));
                    }
                    Some(k) if k > MAX_KEYFRAMES => {
                        return Err(WalkError::configuration(format!(
                            "number of keyframes must be at most {MAX_KEYFRAMES}, got {k}"
                        )));
                    }
                    _ => {}
                }
            }
            Interpolation::CircularLoop => {
                if self.seeds.len() < 3 {
                    return Err(WalkError::configuration(format!(
                        "circular loop needs three anchor seeds, got {}",
                        self.seeds.len()
                    )));
                }
                if !self.diameter.is_finite() || self.diameter < 0.0 {
                    return Err(WalkError::configuration(
                        "circular loop diameter must be finite and non-negative",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Grid actually rendered: circular loops always render a single walk.
    pub fn effective_grid(&self) -> GridDims {
        match self.interpolation {
            Interpolation::Lerp => self.grid,
            Interpolation::CircularLoop => GridDims::SINGLE,
        }
    }
}

/// Parse a comma separated list of seeds and inclusive ranges.
///
/// `"1,2,5-10"` yields `[1, 2, 5, 6, 7, 8, 9, 10]`.
pub fn parse_seed_list(s: &str) -> WalkResult<Vec<u32>> {
    let mut seeds = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if let Some((lo, hi)) = part.split_once('-')
            && is_digits(lo)
            && is_digits(hi)
        {
            let lo = parse_u32(lo, s)?;
            let hi = parse_u32(hi, s)?;
            if lo > hi {
                return Err(WalkError::configuration(format!(
                    "seed range '{part}' is descending"
                )));
            }
            seeds.extend(lo..=hi);
        } else {
            seeds.push(parse_u32(part, s)?);
        }
    }
    Ok(seeds)
}

/// Parse a `"WxH"` or `"W,H"` grid.
pub fn parse_grid(s: &str) -> WalkResult<GridDims> {
    let (w, h) = s
        .split_once(['x', ','])
        .filter(|(w, h)| is_digits(w) && is_digits(h))
        .ok_or_else(|| WalkError::configuration(format!("cannot parse tuple '{s}'")))?;
    GridDims::new(parse_u32(w, s)?, parse_u32(h, s)?)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_u32(part: &str, whole: &str) -> WalkResult<u32> {
    part.parse::<u32>().map_err(|e| {
        WalkError::configuration(format!("invalid integer '{part}' in '{whole}': {e}"))
    })
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
