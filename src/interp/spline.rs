use serde::{Deserialize, Serialize};

use crate::foundation::core::Latent;
use crate::foundation::error::{WalkError, WalkResult};

/// Piecewise interpolant used between keyframes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplineKind {
    /// Snap to the closest keyframe (ties go to the earlier one).
    Nearest,
    /// Straight segments between keyframes.
    Linear,
    /// Cubic spline with not-a-knot end conditions.
    #[default]
    Cubic,
}

impl SplineKind {
    /// Minimum number of axis points the interpolant can be fitted to.
    pub fn min_points(self) -> usize {
        match self {
            Self::Nearest => 1,
            Self::Linear => 2,
            Self::Cubic => 4,
        }
    }
}

/// Cyclic interpolation path through one cell's keyframes.
///
/// The keyframes are tiled `2 * wraps + 1` times on an integer axis starting at
/// `-K * wraps`, so queries in `[0, K]` never see the ends of the fitted data and the value at
/// `t = K` equals the value at `t = 0`.
#[derive(Clone, Debug)]
pub struct SplinePath {
    kind: SplineKind,
    x0: f64,
    len: usize,
    dim: usize,
    // Row-major `[len][dim]`.
    values: Vec<f64>,
    // Second derivatives at each knot, same layout as `values` (cubic only).
    curvature: Vec<f64>,
}

impl SplinePath {
    /// Fit a path through `keyframes` with `wraps` cyclic copies on each side.
    pub fn new(keyframes: &[Latent], wraps: usize, kind: SplineKind) -> WalkResult<Self> {
        let Some(first) = keyframes.first() else {
            return Err(WalkError::configuration(
                "spline path needs at least one keyframe",
            ));
        };
        let dim = first.dim();
        if let Some(bad) = keyframes.iter().find(|k| k.dim() != dim) {
            return Err(WalkError::configuration(format!(
                "keyframe dimension mismatch: {} vs {dim}",
                bad.dim()
            )));
        }

        let k = keyframes.len();
        let (tiles, len) = wraps
            .checked_mul(2)
            .and_then(|w| w.checked_add(1))
            .and_then(|tiles| Some((tiles, k.checked_mul(tiles)?)))
            .ok_or_else(|| {
                WalkError::configuration(format!(
                    "{k} keyframes with {wraps} wraps is too many points to fit"
                ))
            })?;
        if len < kind.min_points() {
            return Err(WalkError::configuration(format!(
                "{kind:?} interpolation needs at least {} points, got {len} ({k} keyframes x {tiles} tiles)",
                kind.min_points()
            )));
        }

        let mut values = Vec::with_capacity(len * dim);
        for i in 0..len {
            values.extend(keyframes[i % k].as_slice().iter().map(|&v| f64::from(v)));
        }

        let curvature = match kind {
            SplineKind::Cubic => not_a_knot_curvature(&values, len, dim),
            SplineKind::Nearest | SplineKind::Linear => Vec::new(),
        };

        Ok(Self {
            kind,
            x0: -((k * wraps) as f64),
            len,
            dim,
            values,
            curvature,
        })
    }

    /// Interpolant kind.
    pub fn kind(&self) -> SplineKind {
        self.kind
    }

    /// Inclusive `(start, end)` of the fitted axis.
    pub fn domain(&self) -> (f64, f64) {
        (self.x0, self.x0 + (self.len - 1) as f64)
    }

    /// Evaluate the path at `t` (in keyframe units).
    pub fn sample(&self, t: f64) -> WalkResult<Latent> {
        let (lo, hi) = self.domain();
        if !(lo..=hi).contains(&t) {
            return Err(WalkError::runtime(format!(
                "interpolation parameter {t} is outside the fitted range [{lo}, {hi}]"
            )));
        }

        let u = t - self.x0;
        let out = match self.kind {
            SplineKind::Nearest => {
                let i = ((u - 0.5).ceil().max(0.0) as usize).min(self.len - 1);
                self.row(&self.values, i).to_vec()
            }
            SplineKind::Linear => {
                let (i, s) = self.segment(u);
                let (a, b) = (self.row(&self.values, i), self.row(&self.values, i + 1));
                a.iter().zip(b).map(|(&a, &b)| a + s * (b - a)).collect()
            }
            SplineKind::Cubic => {
                let (i, s) = self.segment(u);
                let r = 1.0 - s;
                let (ya, yb) = (self.row(&self.values, i), self.row(&self.values, i + 1));
                let (ma, mb) = (
                    self.row(&self.curvature, i),
                    self.row(&self.curvature, i + 1),
                );
                let ca = (r * r * r - r) / 6.0;
                let cb = (s * s * s - s) / 6.0;
                (0..self.dim)
                    .map(|d| r * ya[d] + s * yb[d] + ca * ma[d] + cb * mb[d])
                    .collect()
            }
        };

        Ok(Latent::from_vec(out.into_iter().map(|v| v as f32).collect()))
    }

    fn segment(&self, u: f64) -> (usize, f64) {
        let i = (u.floor().max(0.0) as usize).min(self.len - 2);
        (i, u - i as f64)
    }

    fn row<'a>(&self, data: &'a [f64], i: usize) -> &'a [f64] {
        &data[i * self.dim..(i + 1) * self.dim]
    }
}

/// Second derivatives of the not-a-knot cubic spline through `values` on a unit-spaced axis.
///
/// With unit spacing the not-a-knot conditions pin `M[1]` and `M[n-2]` directly, leaving a
/// tridiagonal `[1, 4, 1]` system for the interior knots.
fn not_a_knot_curvature(values: &[f64], n: usize, dim: usize) -> Vec<f64> {
    let y = |i: usize, d: usize| values[i * dim + d];
    let rhs = |i: usize, d: usize| 6.0 * (y(i + 1, d) - 2.0 * y(i, d) + y(i - 1, d));

    let mut m = vec![0.0; n * dim];
    let interior = n - 4;
    let mut c_prime = vec![0.0; interior];
    let mut d_prime = vec![0.0; interior];

    for d in 0..dim {
        let m1 = rhs(1, d) / 6.0;
        let m_last = rhs(n - 2, d) / 6.0;
        m[dim + d] = m1;
        m[(n - 2) * dim + d] = m_last;

        // Thomas algorithm over knots 2..=n-3.
        for j in 0..interior {
            let i = j + 2;
            let mut r = rhs(i, d);
            if i == 2 {
                r -= m1;
            }
            if i == n - 3 {
                r -= m_last;
            }
            if j == 0 {
                c_prime[j] = 1.0 / 4.0;
                d_prime[j] = r / 4.0;
            } else {
                let denom = 4.0 - c_prime[j - 1];
                c_prime[j] = 1.0 / denom;
                d_prime[j] = (r - d_prime[j - 1]) / denom;
            }
        }
        for j in (0..interior).rev() {
            let next = if j + 1 < interior {
                m[(j + 3) * dim + d]
            } else {
                0.0
            };
            m[(j + 2) * dim + d] = d_prime[j] - c_prime[j] * next;
        }

        m[d] = 2.0 * m[dim + d] - m[2 * dim + d];
        m[(n - 1) * dim + d] = 2.0 * m[(n - 2) * dim + d] - m[(n - 3) * dim + d];
    }

    m
}

#[cfg(test)]
#[path = "../../tests/unit/interp/spline.rs"]
mod tests;
