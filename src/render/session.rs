use crate::config::WalkConfig;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{WalkError, WalkResult};
use crate::grid::{Frame, layout_grid};
use crate::network::Generator;
use crate::render::walk::{LatentWalk, WalkPlan};

/// Summary of a finished render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Grid cells per frame.
    pub cells: usize,
}

/// Anchor the generator's input stage, warning when it has none.
pub fn stabilize_generator(generator: &mut dyn Generator) -> WalkResult<bool> {
    let anchored = generator.stabilize_input()?;
    if anchored {
        tracing::info!("anchored network input transform to the mean latent");
    } else {
        tracing::warn!("network has no affine input stage; stabilization has no effect");
    }
    Ok(anchored)
}

/// Synthesize every cell of `frame` and tile the results.
pub fn render_frame(
    walk: &dyn LatentWalk,
    generator: &dyn Generator,
    frame: FrameIndex,
) -> WalkResult<Frame> {
    let grid = walk.grid();
    let images = (0..grid.cells())
        .map(|cell| generator.synthesize(&walk.latent_at(cell, frame)?))
        .collect::<WalkResult<Vec<_>>>()?;
    layout_grid(&images, grid)
}

/// Render all frames of `walk` in order into `sink`.
///
/// The sink is configured from the first rendered frame. Any failure after that aborts the
/// sink so the encoder is released before the error is returned.
pub fn render_walk(
    walk: &dyn LatentWalk,
    generator: &dyn Generator,
    fps: Fps,
    sink: &mut dyn FrameSink,
) -> WalkResult<RenderStats> {
    let total = walk.total_frames();
    if total == 0 {
        return Err(WalkError::configuration("walk has no frames to render"));
    }

    let result = stream_frames(walk, generator, fps, sink, total);
    if result.is_err() {
        sink.abort();
    }
    result
}

fn stream_frames(
    walk: &dyn LatentWalk,
    generator: &dyn Generator,
    fps: Fps,
    sink: &mut dyn FrameSink,
    total: u64,
) -> WalkResult<RenderStats> {
    let progress_every = (total / 10).max(1);

    for f in 0..total {
        let idx = FrameIndex(f);
        let frame = render_frame(walk, generator, idx)?;
        if f == 0 {
            tracing::info!(
                width = frame.width,
                height = frame.height,
                frames = total,
                seconds = fps.frames_to_secs(total),
                "starting render"
            );
            sink.begin(SinkConfig {
                width: frame.width,
                height: frame.height,
                channels: frame.channels,
                fps,
            })?;
        }
        sink.push_frame(idx, &frame)?;

        tracing::debug!(frame = f, "rendered frame");
        if (f + 1) % progress_every == 0 || f + 1 == total {
            tracing::info!(done = f + 1, total, "progress");
        }
    }
    sink.end()?;

    Ok(RenderStats {
        frames_total: total,
        cells: walk.grid().cells(),
    })
}

/// Plan and render the walk described by `cfg`.
///
/// Stabilization, when requested, is applied to the generator before any latent is mapped.
#[tracing::instrument(skip_all, fields(seeds = cfg.seeds.len()))]
pub fn render_video(
    cfg: &WalkConfig,
    generator: &mut dyn Generator,
    fps: Fps,
    sink: &mut dyn FrameSink,
) -> WalkResult<RenderStats> {
    cfg.validate()?;
    if cfg.stabilize {
        stabilize_generator(generator)?;
    }
    let walk = WalkPlan::build(cfg, &*generator)?;
    let stats = render_walk(&walk, &*generator, fps, sink)?;
    tracing::info!(frames = stats.frames_total, "render finished");
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/render/session.rs"]
mod tests;
