use crate::config::{Interpolation, WalkConfig};
use crate::foundation::core::{FrameIndex, GridDims, Latent};
use crate::foundation::error::{WalkError, WalkResult};
use crate::interp::circular::CircularLoop;
use crate::interp::spline::SplinePath;
use crate::latent::seed::{expand_keyframes, sample_latent};
use crate::network::Generator;

/// What the render loop needs from a walk: one latent per cell per frame.
pub trait LatentWalk {
    /// Grid the walk is rendered on.
    fn grid(&self) -> GridDims;
    /// Number of frames in the video.
    fn total_frames(&self) -> u64;
    /// Mapped latent of cell `cell` (row-major) at `frame`.
    fn latent_at(&self, cell: usize, frame: FrameIndex) -> WalkResult<Latent>;
}

/// A planned walk, fixed before the first frame is rendered.
#[derive(Clone, Debug)]
pub enum WalkPlan {
    /// One cyclic spline per grid cell through that cell's mapped keyframes.
    Keyframes {
        /// Grid of cells.
        grid: GridDims,
        /// Keyframes per cell.
        num_keyframes: usize,
        /// Frames per keyframe interval.
        w_frames: u32,
        /// Row-major paths, one per cell.
        paths: Vec<SplinePath>,
    },
    /// A single precomputed circular loop, one mapped latent per frame.
    Loop {
        /// Mapped latents in frame order.
        frames: Vec<Latent>,
    },
}

impl WalkPlan {
    /// Sample, map and fit the walk described by `cfg`.
    ///
    /// Keyframes and loop points are mapped with `cfg.truncation_psi` up front; rendering then
    /// only runs synthesis.
    #[tracing::instrument(skip_all, fields(mode = ?cfg.interpolation))]
    pub fn build(cfg: &WalkConfig, generator: &dyn Generator) -> WalkResult<Self> {
        cfg.validate()?;
        match cfg.interpolation {
            Interpolation::Lerp => Self::keyframes(cfg, generator),
            Interpolation::CircularLoop => Self::circular(cfg, generator),
        }
    }

    fn keyframes(cfg: &WalkConfig, generator: &dyn Generator) -> WalkResult<Self> {
        let grid = cfg.effective_grid();
        let seeds = expand_keyframes(&cfg.seeds, grid, cfg.num_keyframes, cfg.shuffle_seed)?;
        let z_dim = generator.z_dim();

        let mut paths = Vec::with_capacity(grid.cells());
        for yi in 0..grid.height {
            for xi in 0..grid.width {
                let keyframes = seeds
                    .cell(yi, xi)
                    .iter()
                    .map(|&seed| generator.map(&sample_latent(seed, z_dim), cfg.truncation_psi))
                    .collect::<WalkResult<Vec<_>>>()?;
                paths.push(SplinePath::new(&keyframes, cfg.wraps, cfg.kind)?);
            }
        }

        tracing::info!(
            grid = %format!("{}x{}", grid.width, grid.height),
            num_keyframes = seeds.num_keyframes(),
            kind = ?cfg.kind,
            "planned keyframe walk"
        );
        Ok(Self::Keyframes {
            grid,
            num_keyframes: seeds.num_keyframes(),
            w_frames: cfg.w_frames,
            paths,
        })
    }

    fn circular(cfg: &WalkConfig, generator: &dyn Generator) -> WalkResult<Self> {
        if cfg.grid != cfg.effective_grid() {
            tracing::warn!("circular loop renders a single walk; ignoring grid");
        }
        if cfg.seeds.len() > 3 {
            tracing::warn!(
                seeds = cfg.seeds.len(),
                "circular loop uses the first three seeds as anchors; the rest only lengthen the video"
            );
        }
        if cfg.num_keyframes.is_some() || cfg.shuffle_seed.is_some() {
            tracing::warn!("keyframe count and shuffle seed do not apply to circular loops");
        }

        let z_dim = generator.z_dim();
        let [a, b, c] = [0, 1, 2].map(|i| sample_latent(cfg.seeds[i], z_dim));
        let circle = CircularLoop::new([&a, &b, &c], f64::from(cfg.diameter))?;

        let total = cfg.seeds.len() as u64 * u64::from(cfg.w_frames);
        let frames = circle
            .sample_frames(total)
            .iter()
            .map(|z| generator.map(z, cfg.truncation_psi))
            .collect::<WalkResult<Vec<_>>>()?;

        tracing::info!(
            frames = total,
            diameter = cfg.diameter,
            "planned circular loop"
        );
        Ok(Self::Loop { frames })
    }

    /// Mode this plan was built for.
    pub fn mode(&self) -> Interpolation {
        match self {
            Self::Keyframes { .. } => Interpolation::Lerp,
            Self::Loop { .. } => Interpolation::CircularLoop,
        }
    }
}

impl LatentWalk for WalkPlan {
    fn grid(&self) -> GridDims {
        match self {
            Self::Keyframes { grid, .. } => *grid,
            Self::Loop { .. } => GridDims::SINGLE,
        }
    }

    fn total_frames(&self) -> u64 {
        match self {
            Self::Keyframes {
                num_keyframes,
                w_frames,
                ..
            } => *num_keyframes as u64 * u64::from(*w_frames),
            Self::Loop { frames } => frames.len() as u64,
        }
    }

    fn latent_at(&self, cell: usize, frame: FrameIndex) -> WalkResult<Latent> {
        if frame.0 >= self.total_frames() {
            return Err(WalkError::runtime(format!(
                "frame {} is past the end of the walk ({} frames)",
                frame.0,
                self.total_frames()
            )));
        }
        match self {
            Self::Keyframes {
                paths, w_frames, ..
            } => {
                let path = paths
                    .get(cell)
                    .ok_or_else(|| WalkError::runtime(format!("grid has no cell {cell}")))?;
                path.sample(frame.0 as f64 / f64::from(*w_frames))
            }
            Self::Loop { frames } => {
                if cell != 0 {
                    return Err(WalkError::runtime(format!(
                        "circular loop has a single cell, got cell {cell}"
                    )));
                }
                Ok(frames[frame.0 as usize].clone())
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/walk.rs"]
mod tests;
