use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{WalkError, WalkResult};
use crate::grid::Frame;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Target video bitrate in ffmpeg syntax, e.g. `12M`.
    pub bitrate: String,
    /// Encoder executable, looked up on `PATH` unless it contains a separator.
    pub program: PathBuf,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path` at 12 Mbit/s.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bitrate: "12M".to_string(),
            program: PathBuf::from("ffmpeg"),
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// Output is H.264 `yuv420p` in an MP4 container. A sink that is dropped or aborted before
/// `end` kills the encoder so no child process or pipe outlives the render.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
        }
    }

    /// Whether an encoder process is currently attached.
    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }
}

/// ffmpeg `-pix_fmt` name for interleaved 8-bit frames with `channels` channels.
pub fn raw_pix_fmt(channels: u32) -> WalkResult<&'static str> {
    match channels {
        1 => Ok("gray"),
        3 => Ok("rgb24"),
        4 => Ok("rgba"),
        n => Err(WalkError::configuration(format!(
            "cannot encode {n}-channel frames"
        ))),
    }
}

fn validate_config(cfg: &SinkConfig) -> WalkResult<()> {
    if cfg.width == 0 || cfg.height == 0 {
        return Err(WalkError::configuration(
            "ffmpeg sink width/height must be non-zero",
        ));
    }
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(WalkError::configuration(format!(
            "frame size {}x{} must be even (required for yuv420p mp4 output)",
            cfg.width, cfg.height
        )));
    }
    raw_pix_fmt(cfg.channels)?;
    Ok(())
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> WalkResult<()> {
        validate_config(&cfg)?;
        if self.child.is_some() {
            return Err(WalkError::runtime("ffmpeg sink already started"));
        }

        if !is_encoder_available(&self.opts.program) {
            return Err(WalkError::resource(format!(
                "{} is required for MP4 encoding, but was not found",
                self.opts.program.display()
            )));
        }

        // Probe writability without touching existing contents; ffmpeg truncates on `-y`.
        ensure_parent_dir(&self.opts.out_path)?;
        if self.opts.overwrite {
            std::fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(&self.opts.out_path)
                .map_err(|e| {
                    WalkError::resource(format!(
                        "cannot open output file '{}' for writing: {e}",
                        self.opts.out_path.display()
                    ))
                })?;
        } else if self.opts.out_path.exists() {
            return Err(WalkError::resource(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let mut cmd = Command::new(&self.opts.program);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            raw_pix_fmt(cfg.channels)?,
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args([
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-b:v",
            &self.opts.bitrate,
            "-movflags",
            "+faststart",
        ])
        .arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            WalkError::resource(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let Some(stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(WalkError::runtime("failed to open ffmpeg stdin (unexpected)"));
        };
        let Some(mut stderr) = child.stderr.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(WalkError::runtime("failed to open ffmpeg stderr (unexpected)"));
        };
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            "spawned ffmpeg"
        );

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> WalkResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| WalkError::runtime("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(WalkError::runtime(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        cfg.check_frame(frame)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(WalkError::runtime("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&frame.data).map_err(|e| {
            WalkError::runtime(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        self.last_idx = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> WalkResult<()> {
        drop(self.stdin.take());

        let Some(mut child) = self.child.take() else {
            return Err(WalkError::runtime("ffmpeg sink not started"));
        };
        let status = child
            .wait()
            .map_err(|e| WalkError::runtime(format!("failed to wait for ffmpeg to finish: {e}")))?;

        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| WalkError::runtime("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| WalkError::runtime(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(WalkError::runtime(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(
                out = %self.opts.out_path.display(),
                "aborted ffmpeg; output file is incomplete"
            );
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        self.cfg = None;
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        self.abort();
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` goes before `-i` and accepts rational `num/den`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> WalkResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            WalkError::resource(format!(
                "failed to create output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_encoder_available(Path::new("ffmpeg"))
}

fn is_encoder_available(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
