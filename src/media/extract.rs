use std::path::Path;
use std::process::Command;

use crate::foundation::core::Fps;
use crate::foundation::error::{MilkError, MilkResult};
use crate::media::frames::{DEFAULT_FRAME_EXT, frame_file_pattern};
use crate::media::probe::{VideoSourceInfo, is_ffmpeg_on_path, probe_video};

/// What to extract from a source video.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractRequest {
    /// Desired sampling rate; `None` keeps every source frame.
    pub target_fps: Option<u32>,
    /// Optional output size `(width, height)`.
    pub scale: Option<(u32, u32)>,
    /// Frame image extension.
    pub ext: String,
}

impl Default for ExtractRequest {
    fn default() -> Self {
        Self {
            target_fps: None,
            scale: None,
            ext: DEFAULT_FRAME_EXT.to_string(),
        }
    }
}

/// Source of decoded frames.
///
/// Implementations write `frame%06d.<ext>` files, numbered from 0, into a flat directory.
pub trait VideoDecoder: Send + Sync {
    /// Read stream facts of `source`.
    fn probe(&self, source: &Path) -> MilkResult<VideoSourceInfo>;
    /// Extract frames of `source` into `out_dir` (which already exists).
    fn extract(
        &self,
        source: &VideoSourceInfo,
        out_dir: &Path,
        req: &ExtractRequest,
    ) -> MilkResult<()>;
}

/// Keep one frame every `stride` source frames.
///
/// `stride = floor(source_fps / target_fps)`, never below 1.
pub fn frame_stride(source_fps: Fps, target_fps: u32) -> u64 {
    if target_fps == 0 {
        return 1;
    }
    let stride = u64::from(source_fps.num) / (u64::from(source_fps.den) * u64::from(target_fps));
    stride.max(1)
}

/// [`VideoDecoder`] backed by the system `ffmpeg`/`ffprobe` binaries.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegDecoder;

impl FfmpegDecoder {
    /// Build the `ffmpeg` invocation for `req`.
    pub fn command(
        &self,
        source: &VideoSourceInfo,
        out_dir: &Path,
        req: &ExtractRequest,
    ) -> Command {
        let stride = req
            .target_fps
            .map(|t| frame_stride(source.fps, t))
            .unwrap_or(1);

        let mut filters = Vec::new();
        if stride > 1 {
            filters.push(format!("select=not(mod(n\\,{stride}))"));
        }
        if let Some((w, h)) = req.scale {
            filters.push(format!("scale={w}:{h}"));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-v", "error", "-y", "-i"]).arg(&source.source_path);
        if !filters.is_empty() {
            cmd.args(["-vf", &filters.join(",")]);
        }
        cmd.args([
            "-an",
            "-fps_mode",
            "vfr",
            "-q:v",
            "2",
            "-start_number",
            "0",
        ])
        .arg(out_dir.join(frame_file_pattern(&req.ext)));
        cmd
    }
}

impl VideoDecoder for FfmpegDecoder {
    fn probe(&self, source: &Path) -> MilkResult<VideoSourceInfo> {
        probe_video(source)
    }

    #[tracing::instrument(skip(self, source), fields(source = %source.source_path.display()))]
    fn extract(
        &self,
        source: &VideoSourceInfo,
        out_dir: &Path,
        req: &ExtractRequest,
    ) -> MilkResult<()> {
        if !is_ffmpeg_on_path() {
            return Err(MilkError::source_open(
                "ffmpeg is required for frame extraction, but was not found on PATH",
            ));
        }

        let out = self
            .command(source, out_dir, req)
            .output()
            .map_err(|e| MilkError::source_open(format!("failed to run ffmpeg: {e}")))?;
        if !out.status.success() {
            return Err(MilkError::source_open(format!(
                "ffmpeg frame extraction of '{}' exited with status {}: {}",
                source.source_path.display(),
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/extract.rs"]
mod tests;
