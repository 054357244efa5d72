use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};

use latent_walk::{
    FfmpegSink, FfmpegSinkOpts, FourierGenerator, Fps, FrameSink, Interpolation, PngSequenceSink,
    SplineKind, WalkConfig,
};

/// Render a looping latent-space walk of a pretrained generator to video.
#[derive(Parser, Debug)]
#[command(name = "latent-walk", version)]
struct Cli {
    /// Network checkpoint: a directory with `config.json` and `model.safetensors`, or the
    /// `.safetensors` file itself.
    #[arg(long)]
    network: PathBuf,

    /// Seeds as a comma separated list of values and inclusive ranges, e.g. `1,2,5-10`.
    #[arg(long)]
    seeds: String,

    /// How to travel between seeds.
    #[arg(long, value_enum, default_value_t = InterpolationArg::Lerp)]
    interpolation: InterpolationArg,

    /// Shuffle the expanded keyframe seeds with this seed.
    #[arg(long)]
    shuffle_seed: Option<u64>,

    /// Grid of independent walks as `WxH` or `W,H`.
    #[arg(long, default_value = "1x1")]
    grid: String,

    /// Keyframes per grid cell. Defaults to seeds / cells.
    #[arg(long)]
    num_keyframes: Option<usize>,

    /// Frames per keyframe interval (per seed in circular loops).
    #[arg(long, default_value_t = 120)]
    w_frames: u32,

    /// Spline used between keyframes.
    #[arg(long, value_enum, default_value_t = KindArg::Cubic)]
    kind: KindArg,

    /// Copies of the keyframe sequence on each side of the loop.
    #[arg(long, default_value_t = 2)]
    wraps: usize,

    /// Diameter of the circular loop in latent units.
    #[arg(long, default_value_t = 100.0)]
    diameter: f32,

    /// Truncation psi.
    #[arg(long = "trunc", default_value_t = 1.0)]
    truncation_psi: f32,

    /// Anchor the network's input transform to the mean latent.
    #[arg(long, default_value_t = false)]
    stabilize_video: bool,

    /// Output MP4 path, or a directory for `--sink png`.
    #[arg(long)]
    output: PathBuf,

    /// Output frame rate.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Video bitrate in ffmpeg syntax.
    #[arg(long, default_value = "12M")]
    bitrate: String,

    /// Where frames go.
    #[arg(long, value_enum, default_value_t = SinkArg::Mp4)]
    sink: SinkArg,

    /// Log every frame.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InterpolationArg {
    Lerp,
    Circularloop,
}

impl From<InterpolationArg> for Interpolation {
    fn from(value: InterpolationArg) -> Self {
        match value {
            InterpolationArg::Lerp => Self::Lerp,
            InterpolationArg::Circularloop => Self::CircularLoop,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Nearest,
    Linear,
    Cubic,
}

impl From<KindArg> for SplineKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Nearest => Self::Nearest,
            KindArg::Linear => Self::Linear,
            KindArg::Cubic => Self::Cubic,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SinkArg {
    /// H.264 MP4 through the system `ffmpeg`.
    Mp4,
    /// Numbered PNG files in a directory.
    Png,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let cfg = walk_config(&cli)?;
    let fps = Fps::new(cli.fps, 1)?;

    let mut generator = FourierGenerator::load(&cli.network)
        .with_context(|| format!("load network '{}'", cli.network.display()))?;

    let mut sink: Box<dyn FrameSink> = match cli.sink {
        SinkArg::Mp4 => {
            let mut opts = FfmpegSinkOpts::new(&cli.output);
            opts.bitrate = cli.bitrate.clone();
            Box::new(FfmpegSink::new(opts))
        }
        SinkArg::Png => Box::new(PngSequenceSink::new(&cli.output)),
    };

    let stats = latent_walk::render_video(&cfg, &mut generator, fps, sink.as_mut())?;

    eprintln!(
        "wrote {} ({} frames)",
        cli.output.display(),
        stats.frames_total
    );
    Ok(())
}

fn walk_config(cli: &Cli) -> anyhow::Result<WalkConfig> {
    let seeds = latent_walk::parse_seed_list(&cli.seeds).context("parse --seeds")?;
    let grid = latent_walk::parse_grid(&cli.grid).context("parse --grid")?;

    let mut cfg = WalkConfig::new(seeds);
    cfg.interpolation = cli.interpolation.into();
    cfg.shuffle_seed = cli.shuffle_seed;
    cfg.grid = grid;
    cfg.num_keyframes = cli.num_keyframes;
    cfg.w_frames = cli.w_frames;
    cfg.kind = cli.kind.into();
    cfg.wraps = cli.wraps;
    cfg.diameter = cli.diameter;
    cfg.truncation_psi = cli.truncation_psi;
    cfg.stabilize = cli.stabilize_video;
    cfg.validate()?;
    Ok(cfg)
}
