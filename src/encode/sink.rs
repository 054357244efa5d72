use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{WalkError, WalkResult};
use crate::grid::Frame;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Interleaved channels per pixel.
    pub channels: u32,
    /// Output frame rate.
    pub fps: Fps,
}

impl SinkConfig {
    /// Size in bytes of one frame.
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    /// Check that `frame` matches this configuration.
    pub fn check_frame(&self, frame: &Frame) -> WalkResult<()> {
        if frame.width != self.width
            || frame.height != self.height
            || frame.channels != self.channels
        {
            return Err(WalkError::runtime(format!(
                "frame size mismatch: got {}x{}x{}, expected {}x{}x{}",
                frame.width, frame.height, frame.channels, self.width, self.height, self.channels
            )));
        }
        if frame.data.len() != self.frame_bytes() {
            return Err(WalkError::runtime(
                "frame.data size mismatch with width*height*channels",
            ));
        }
        Ok(())
    }
}

/// Sink contract for consuming rendered frames.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order between `begin` and `end`.
/// After a failed render the caller invokes `abort` instead of `end`.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> WalkResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> WalkResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> WalkResult<()>;
    /// Release any held resources after a failure. Safe to call in any state.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, Frame)>,
    finished: bool,
    aborted: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, Frame)] {
        &self.frames
    }

    /// Whether `end` was called.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Whether `abort` was called.
    pub fn aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> WalkResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> WalkResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> WalkResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

/// Writes each frame as `frame_NNNNNN.png` into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl PngSequenceSink {
    /// Create a sink writing into `dir` (created on `begin`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Path the frame with index `idx` is written to.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        frame_path(&self.dir, idx)
    }
}

fn frame_path(dir: &Path, idx: FrameIndex) -> PathBuf {
    dir.join(format!("frame_{:06}.png", idx.0))
}

fn color_type(channels: u32) -> WalkResult<image::ColorType> {
    match channels {
        1 => Ok(image::ColorType::L8),
        3 => Ok(image::ColorType::Rgb8),
        4 => Ok(image::ColorType::Rgba8),
        n => Err(WalkError::configuration(format!(
            "cannot write {n}-channel frames as PNG"
        ))),
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> WalkResult<()> {
        color_type(cfg.channels)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            WalkError::resource(format!(
                "failed to create frame directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> WalkResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| WalkError::runtime("png sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(WalkError::runtime(
                "png sink received out-of-order frame index",
            ));
        }
        cfg.check_frame(frame)?;

        let path = frame_path(&self.dir, idx);
        image::save_buffer_with_format(
            &path,
            &frame.data,
            frame.width,
            frame.height,
            color_type(frame.channels)?,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        self.last_idx = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> WalkResult<()> {
        self.cfg = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
