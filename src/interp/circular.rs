use std::f64::consts::TAU;

use crate::foundation::core::Latent;
use crate::foundation::error::{WalkError, WalkResult};

/// Closed circle around anchor `a` in the plane spanned by `a - b` and `a - c`.
///
/// The two axes are normalized but not orthogonalized, so the loop follows the anchors'
/// geometry and is an ellipse whenever they are not perpendicular.
#[derive(Clone, Debug)]
pub struct CircularLoop {
    center: Vec<f64>,
    axis_x: Vec<f64>,
    axis_y: Vec<f64>,
    radius: f64,
}

impl CircularLoop {
    /// Build a loop of the given `diameter` from anchors `[a, b, c]`.
    pub fn new(anchors: [&Latent; 3], diameter: f64) -> WalkResult<Self> {
        let [a, b, c] = anchors;
        let axis_x = a.direction_from(b).map_err(|_| {
            WalkError::configuration("circular loop anchors a and b must differ")
        })?;
        let axis_y = a.direction_from(c).map_err(|_| {
            WalkError::configuration("circular loop anchors a and c must differ")
        })?;
        Ok(Self {
            center: a.as_slice().iter().map(|&v| f64::from(v)).collect(),
            axis_x,
            axis_y,
            radius: diameter / 2.0,
        })
    }

    /// Loop radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Point at loop position `p`, where `p = 0` and `p = 1` coincide.
    pub fn point(&self, p: f64) -> Latent {
        let (sin, cos) = (TAU * p).sin_cos();
        let (dx, dy) = (self.radius * sin, self.radius * cos);
        let values = self
            .center
            .iter()
            .zip(self.axis_x.iter().zip(&self.axis_y))
            .map(|(&c, (&x, &y))| (c + dx * x + dy * y) as f32)
            .collect();
        Latent::from_vec(values)
    }

    /// `frames` evenly spaced points at `p = i / frames`; the loop closes without repeating
    /// its first point.
    pub fn sample_frames(&self, frames: u64) -> Vec<Latent> {
        (0..frames)
            .map(|i| self.point(i as f64 / frames as f64))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interp/circular.rs"]
mod tests;
