/// Crate-wide result alias.
pub type MilkResult<T> = Result<T, MilkError>;

/// Errors produced by the filter pipeline.
///
/// Per-frame decode failures ([`MilkError::FrameDecode`]) are recoverable: the scheduler skips
/// the frame and counts it. Every other variant aborts the stage that raised it.
#[derive(thiserror::Error, Debug)]
pub enum MilkError {
    /// Source video cannot be opened, probed or decoded into frames.
    #[error("source open error: {0}")]
    SourceOpen(String),

    /// A single frame image could not be read.
    #[error("frame decode error: {0}")]
    FrameDecode(String),

    /// A working or output directory could not be created, cleared or listed.
    #[error("directory error: {0}")]
    Directory(String),

    /// The external muxing process failed or could not be started.
    #[error("encode process error: {0}")]
    EncodeProcess(String),

    /// Invalid configuration value.
    #[error("validation error: {0}")]
    Validation(String),

    /// Hard failure while filtering or writing a frame.
    #[error("filter error: {0}")]
    Filter(String),

    /// The run was cancelled before every frame was processed.
    #[error("run cancelled")]
    Cancelled,

    /// Wrapped error with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MilkError {
    /// Build a [`MilkError::SourceOpen`].
    pub fn source_open(msg: impl Into<String>) -> Self {
        Self::SourceOpen(msg.into())
    }

    /// Build a [`MilkError::FrameDecode`].
    pub fn frame_decode(msg: impl Into<String>) -> Self {
        Self::FrameDecode(msg.into())
    }

    /// Build a [`MilkError::Directory`].
    pub fn directory(msg: impl Into<String>) -> Self {
        Self::Directory(msg.into())
    }

    /// Build a [`MilkError::EncodeProcess`].
    pub fn encode_process(msg: impl Into<String>) -> Self {
        Self::EncodeProcess(msg.into())
    }

    /// Build a [`MilkError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MilkError::Filter`].
    pub fn filter(msg: impl Into<String>) -> Self {
        Self::Filter(msg.into())
    }

    /// `true` for errors the scheduler absorbs by skipping the frame.
    pub fn is_frame_recoverable(&self) -> bool {
        matches!(self, Self::FrameDecode(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
