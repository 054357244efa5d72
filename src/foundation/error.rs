/// Result alias used throughout the crate.
pub type WalkResult<T> = Result<T, WalkError>;

/// Error taxonomy for latent walk rendering.
///
/// Every error is fatal for a run; callers are expected to propagate it to the top level.
#[derive(thiserror::Error, Debug)]
pub enum WalkError {
    /// Malformed user input or an impossible combination of settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A checkpoint, output path or external tool could not be opened.
    #[error("resource error: {0}")]
    Resource(String),

    /// Failure inside network evaluation or video encoding.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Contextual errors from I/O helpers.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WalkError {
    /// Build a [`WalkError::Configuration`].
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`WalkError::Resource`].
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`WalkError::Runtime`].
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}

impl From<candle_core::Error> for WalkError {
    fn from(err: candle_core::Error) -> Self {
        Self::Runtime(format!("network evaluation failed: {err}"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
