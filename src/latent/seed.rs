use rand::{Rng, SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::foundation::core::{GridDims, Latent};
use crate::foundation::error::{WalkError, WalkResult};

/// Sample a standard-normal latent of dimension `dim` from `seed`.
///
/// Each call owns a fresh generator, so the result depends on `(seed, dim)` only.
pub fn sample_latent(seed: u32, dim: usize) -> Latent {
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed));
    let values = (0..dim)
        .map(|_| rng.sample::<f32, _>(StandardNormal))
        .collect();
    Latent::from_vec(values)
}

/// Seeds laid out as `[height][width][num_keyframes]`, one keyframe list per grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyframeSeeds {
    grid: GridDims,
    num_keyframes: usize,
    seeds: Vec<u32>,
}

impl KeyframeSeeds {
    /// Grid the seeds are laid out on.
    pub fn grid(&self) -> GridDims {
        self.grid
    }

    /// Keyframes per cell.
    pub fn num_keyframes(&self) -> usize {
        self.num_keyframes
    }

    /// All expanded seeds in row-major cell order.
    pub fn as_slice(&self) -> &[u32] {
        &self.seeds
    }

    /// Keyframe seeds of the cell at row `yi`, column `xi`.
    pub fn cell(&self, yi: u32, xi: u32) -> &[u32] {
        let start = self.grid.cell_index(yi, xi) * self.num_keyframes;
        &self.seeds[start..start + self.num_keyframes]
    }
}

/// Expand `seeds` into per-cell keyframe lists.
///
/// Without an explicit `num_keyframes` the seed count must divide evenly by the grid's cell
/// count. The expanded array cycles through `seeds` and is optionally permuted by a generator
/// seeded only with `shuffle_seed`.
pub fn expand_keyframes(
    seeds: &[u32],
    grid: GridDims,
    num_keyframes: Option<usize>,
    shuffle_seed: Option<u64>,
) -> WalkResult<KeyframeSeeds> {
    if seeds.is_empty() {
        return Err(WalkError::configuration("at least one seed is required"));
    }

    let cells = grid.cells();
    let num_keyframes = match num_keyframes {
        Some(0) => {
            return Err(WalkError::configuration(
                "number of keyframes must be non-zero",
            ));
        }
        Some(k) => k,
        None => {
            if !seeds.len().is_multiple_of(cells) {
                return Err(WalkError::configuration(format!(
                    "number of input seeds ({}) must be divisible by grid W*H ({}x{} = {cells})",
                    seeds.len(),
                    grid.width,
                    grid.height
                )));
            }
            seeds.len() / cells
        }
    };

    let total = num_keyframes.checked_mul(cells).ok_or_else(|| {
        WalkError::configuration(format!(
            "{num_keyframes} keyframes per cell over {cells} cells is too many"
        ))
    })?;
    let mut expanded: Vec<u32> = (0..total)
        .map(|idx| seeds[idx % seeds.len()])
        .collect();

    if let Some(shuffle_seed) = shuffle_seed {
        let mut rng = ChaCha8Rng::seed_from_u64(shuffle_seed);
        expanded.shuffle(&mut rng);
    }

    Ok(KeyframeSeeds {
        grid,
        num_keyframes,
        seeds: expanded,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/latent/seed.rs"]
mod tests;
