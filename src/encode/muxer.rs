use std::path::PathBuf;

use crate::foundation::core::Fps;
use crate::foundation::error::{MilkError, MilkResult};

/// Everything the muxing step needs.
#[derive(Clone, Debug, PartialEq)]
pub struct MuxRequest {
    /// Directory holding the filtered frames.
    pub frames_dir: PathBuf,
    /// Extension of the frame images.
    pub frame_ext: String,
    /// Output frame rate.
    pub fps: Fps,
    /// Original video whose audio track is copied over, if any.
    pub audio_source: Option<PathBuf>,
    /// Output video path.
    pub out_path: PathBuf,
    /// Overwrite `out_path` if it already exists.
    pub overwrite: bool,
}

impl MuxRequest {
    /// Check the request before spawning anything.
    pub fn validate(&self) -> MilkResult<()> {
        if self.frame_ext.is_empty() {
            return Err(MilkError::validation("frame extension must not be empty"));
        }
        if !self.frames_dir.is_dir() {
            return Err(MilkError::directory(format!(
                "frames directory '{}' does not exist",
                self.frames_dir.display()
            )));
        }
        if !self.overwrite && self.out_path.exists() {
            return Err(MilkError::validation(format!(
                "output file '{}' already exists",
                self.out_path.display()
            )));
        }
        Ok(())
    }
}

/// Sink that turns a directory of filtered frames into a video file.
pub trait VideoEncoder: Send + Sync {
    /// Produce `req.out_path`; a failed encode must surface as an error.
    fn mux(&self, req: &MuxRequest) -> MilkResult<()>;
}
