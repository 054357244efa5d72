//! Encoding sinks.
//!
//! Sinks consume rendered frames in output order and are driven by the render loop.

/// `ffmpeg`-based MP4 sink.
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
