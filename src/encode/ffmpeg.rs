use std::process::{Command, Stdio};

use crate::encode::muxer::{MuxRequest, VideoEncoder};
use crate::foundation::error::{MilkError, MilkResult};
use crate::media::frames::ensure_parent_dir;
use crate::media::probe::is_ffmpeg_on_path;

/// [`VideoEncoder`] that runs the system `ffmpeg`: H.264 + AAC, yuv420p, shortest stream wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegMuxer;

impl FfmpegMuxer {
    /// Build the `ffmpeg` invocation for `req`. Arguments are passed verbatim, never through a
    /// shell.
    pub fn command(&self, req: &MuxRequest) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.args(["-loglevel", "error"]);
        cmd.arg(if req.overwrite { "-y" } else { "-n" });

        // Input 0: filtered frames. The glob tolerates gaps left by skipped frames.
        cmd.args([
            "-framerate",
            &format!("{}/{}", req.fps.num, req.fps.den),
            "-pattern_type",
            "glob",
            "-i",
        ])
        .arg(frame_glob(req));

        // Input 1: original video, audio only. `?` keeps sources without audio working.
        if let Some(src) = req.audio_source.as_ref() {
            cmd.arg("-i")
                .arg(src)
                .args(["-map", "0:v:0", "-map", "1:a:0?", "-c:a", "aac", "-shortest"]);
        } else {
            cmd.arg("-an");
        }

        // yuv420p needs even dimensions.
        cmd.args([
            "-vf",
            "scale=trunc(iw/2)*2:trunc(ih/2)*2",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
        ]);
        if wants_faststart(req) {
            cmd.args(["-movflags", "+faststart"]);
        }
        cmd.arg(&req.out_path);
        cmd
    }
}

/// Glob over the frame files. The directory and extension are escaped so that `[`, `*` and
/// friends in a user-supplied path are matched literally by glob(3).
fn frame_glob(req: &MuxRequest) -> String {
    let mut out = escape_glob(&req.frames_dir.to_string_lossy());
    if !out.is_empty() && !out.ends_with(std::path::MAIN_SEPARATOR) {
        out.push(std::path::MAIN_SEPARATOR);
    }
    out.push_str("*.");
    out.push_str(&escape_glob(&req.frame_ext));
    out
}

fn escape_glob(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '*' | '?' | '[' | ']' | '{' | '}') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn wants_faststart(req: &MuxRequest) -> bool {
    req.out_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ["mp4", "m4v", "mov"].iter().any(|k| k.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

impl VideoEncoder for FfmpegMuxer {
    #[tracing::instrument(skip(self), fields(out = %req.out_path.display()))]
    fn mux(&self, req: &MuxRequest) -> MilkResult<()> {
        req.validate()?;
        ensure_parent_dir(&req.out_path)?;

        if !is_ffmpeg_on_path() {
            return Err(MilkError::encode_process(
                "ffmpeg is required for muxing, but was not found on PATH",
            ));
        }

        let output = self.command(req).output().map_err(|e| {
            MilkError::encode_process(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MilkError::encode_process(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
