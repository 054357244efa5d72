use crate::foundation::error::{WalkError, WalkResult};

/// Absolute 0-based frame index in output video order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> WalkResult<Self> {
        if den == 0 {
            return Err(WalkError::configuration("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(WalkError::configuration("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }
}

/// Grid of independent walks, `width` columns by `height` rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridDims {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl GridDims {
    /// A single-cell grid.
    pub const SINGLE: Self = Self {
        width: 1,
        height: 1,
    };

    /// Create a validated grid with both dimensions non-zero.
    pub fn new(width: u32, height: u32) -> WalkResult<Self> {
        if width == 0 || height == 0 {
            return Err(WalkError::configuration(format!(
                "grid dimensions must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Total number of cells.
    pub fn cells(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major cell index of `(yi, xi)`.
    pub fn cell_index(self, yi: u32, xi: u32) -> usize {
        yi as usize * self.width as usize + xi as usize
    }
}

impl Default for GridDims {
    fn default() -> Self {
        Self::SINGLE
    }
}

/// A point in a network's latent space.
///
/// Latents are created by sampling, mapping or interpolation and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Latent(Vec<f32>);

impl Latent {
    /// Wrap raw coordinates.
    pub fn from_vec(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Number of coordinates.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Borrow the coordinates.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Consume into the raw coordinates.
    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }

    /// Euclidean norm, accumulated in `f64`.
    pub fn norm(&self) -> f64 {
        self.0
            .iter()
            .map(|&v| f64::from(v) * f64::from(v))
            .sum::<f64>()
            .sqrt()
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Latent) -> WalkResult<f64> {
        ensure_same_dim(self, other)?;
        Ok(self
            .0
            .iter()
            .zip(&other.0)
            .map(|(&a, &b)| {
                let d = f64::from(a) - f64::from(b);
                d * d
            })
            .sum::<f64>()
            .sqrt())
    }

    /// Unit vector pointing from `to` towards `self`.
    ///
    /// Fails when both points coincide.
    pub fn direction_from(&self, to: &Latent) -> WalkResult<Vec<f64>> {
        ensure_same_dim(self, to)?;
        let diff: Vec<f64> = self
            .0
            .iter()
            .zip(&to.0)
            .map(|(&a, &b)| f64::from(a) - f64::from(b))
            .collect();
        let len = diff.iter().map(|d| d * d).sum::<f64>().sqrt();
        if len == 0.0 || !len.is_finite() {
            return Err(WalkError::configuration(
                "cannot derive a direction between identical latents",
            ));
        }
        Ok(diff.into_iter().map(|d| d / len).collect())
    }
}

fn ensure_same_dim(a: &Latent, b: &Latent) -> WalkResult<()> {
    if a.dim() != b.dim() {
        return Err(WalkError::configuration(format!(
            "latent dimension mismatch: {} vs {}",
            a.dim(),
            b.dim()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
