use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::core::Fps;
use crate::foundation::error::{MilkError, MilkResult};

/// Stream facts about a source video.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSourceInfo {
    /// Path the facts were read from.
    pub source_path: PathBuf,
    /// Width of the first video stream.
    pub width: u32,
    /// Height of the first video stream.
    pub height: u32,
    /// Frame rate of the first video stream.
    pub fps: Fps,
    /// Container duration, `0.0` when unknown.
    pub duration_sec: f64,
    /// Whether the container has at least one audio stream.
    pub has_audio: bool,
}

/// Return `true` when `tool -version` runs successfully from `PATH`.
pub fn tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    tool_on_path("ffmpeg")
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    tool_on_path("ffprobe")
}

/// Read stream facts with `ffprobe`.
///
/// Every failure, including a missing `ffprobe`, is a [`MilkError::SourceOpen`].
#[tracing::instrument]
pub fn probe_video(source_path: &Path) -> MilkResult<VideoSourceInfo> {
    if !source_path.is_file() {
        return Err(MilkError::source_open(format!(
            "'{}' does not exist or is not a file",
            source_path.display()
        )));
    }
    if !is_ffprobe_on_path() {
        return Err(MilkError::source_open(
            "ffprobe is required to read the source video, but was not found on PATH",
        ));
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| MilkError::source_open(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(MilkError::source_open(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    parse_probe_json(&out.stdout, source_path)
}

/// Parse `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_json(json: &[u8], source_path: &Path) -> MilkResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        avg_frame_rate: Option<String>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| MilkError::source_open(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            MilkError::source_open(format!("no video stream in '{}'", source_path.display()))
        })?;
    let width = video
        .width
        .ok_or_else(|| MilkError::source_open("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| MilkError::source_open("missing video height from ffprobe"))?;

    // avg_frame_rate is "0/0" for some streams; fall back to r_frame_rate.
    let fps = [video.avg_frame_rate.as_deref(), video.r_frame_rate.as_deref()]
        .into_iter()
        .flatten()
        .find_map(Fps::parse_ratio)
        .ok_or_else(|| {
            MilkError::source_open(format!(
                "cannot read frame rate of '{}'",
                source_path.display()
            ))
        })?;

    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps,
        duration_sec,
        has_audio,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
