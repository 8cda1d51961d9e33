use std::path::{Path, PathBuf};

use crate::dither::sampler::DitherSampler;
use crate::encode::ffmpeg::FfmpegMuxer;
use crate::encode::muxer::{MuxRequest, VideoEncoder};
use crate::filter::config::FilterConfig;
use crate::filter::engine::FrameFilter;
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{MilkError, MilkResult};
use crate::media::extract::{ExtractRequest, FfmpegDecoder, VideoDecoder, frame_stride};
use crate::media::frames::{FrameSet, ensure_parent_dir, prepare_dir, read_frame, write_frame};
use crate::media::probe::VideoSourceInfo;
use crate::pipeline::config::{PipelineConfig, default_image_output_path};
use crate::schedule::pool::{CancelToken, FrameScheduler, Progress, RunStats};

const EXTRACTED_DIR: &str = "og";
const FILTERED_DIR: &str = "filtered";

/// Result of a successful video run.
#[derive(Clone, Debug)]
pub struct PipelineReport {
    /// Probed facts about the source.
    pub source: VideoSourceInfo,
    /// Written video.
    pub output: PathBuf,
    /// Frame rate the output was encoded at.
    pub fps: Fps,
    /// Source frames per extracted frame.
    pub stride: u64,
    /// Filter run statistics.
    pub stats: RunStats,
    /// Intermediate directory, when kept.
    pub work_dir: Option<PathBuf>,
}

/// Video filter pipeline over pluggable decode and encode backends.
///
/// Stages run strictly in sequence; only the filter stage is parallel.
#[derive(Debug)]
pub struct Pipeline<D = FfmpegDecoder, E = FfmpegMuxer> {
    decoder: D,
    encoder: E,
    cancel: CancelToken,
    progress: Progress,
}

impl Pipeline {
    /// Pipeline using the system `ffmpeg`/`ffprobe`.
    pub fn ffmpeg() -> Self {
        Self::new(FfmpegDecoder, FfmpegMuxer)
    }
}

impl<D: VideoDecoder, E: VideoEncoder> Pipeline<D, E> {
    /// Pipeline over custom backends.
    pub fn new(decoder: D, encoder: E) -> Self {
        Self {
            decoder,
            encoder,
            cancel: CancelToken::new(),
            progress: Progress::new(),
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Handle for polling filter progress from another thread.
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    /// Handle for cancelling a run from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the whole video pipeline for `cfg`.
    ///
    /// Either the output video is written or an error is returned; frames that fail to decode
    /// are skipped and listed in the report. Intermediate directories are removed afterwards
    /// unless `keep_frames` is set, also when the run fails.
    #[tracing::instrument(skip_all, fields(source = %cfg.source.display()))]
    pub fn run(&self, cfg: &PipelineConfig) -> MilkResult<PipelineReport> {
        cfg.validate()?;
        let filter = FrameFilter::from_config(&cfg.filter)?;
        let output = cfg.output_path();

        let info = self.decoder.probe(&cfg.source)?;
        tracing::info!(
            width = info.width,
            height = info.height,
            fps = info.fps.as_f64(),
            duration = info.duration_sec,
            audio = info.has_audio,
            "probed source"
        );

        let (fps, stride) = match cfg.target_fps {
            Some(t) => (Fps::integer(t)?, frame_stride(info.fps, t)),
            None => (info.fps, 1),
        };

        let work = WorkDir::create(cfg.work_dir(), cfg.keep_frames)?;
        let req = ExtractRequest {
            target_fps: cfg.target_fps,
            scale: cfg.scale,
            ..ExtractRequest::default()
        };
        self.decoder.extract(&info, work.extracted(), &req)?;

        let frames = FrameSet::scan(work.extracted())?;
        if frames.is_empty() {
            return Err(MilkError::source_open(format!(
                "no frames could be extracted from '{}'",
                cfg.source.display()
            )));
        }
        tracing::info!(frames = frames.len(), stride, "extracted frames");

        let stats = self.filter_set(&frames, work.filtered(), &cfg.filter, filter)?;
        if stats.frames_written == 0 {
            return Err(MilkError::filter(format!(
                "all {} extracted frames failed to decode",
                stats.frames_total
            )));
        }

        let mux = MuxRequest {
            frames_dir: work.filtered().to_path_buf(),
            frame_ext: req.ext.clone(),
            fps,
            audio_source: info.has_audio.then(|| cfg.source.clone()),
            out_path: output.clone(),
            overwrite: cfg.overwrite,
        };
        self.encoder.mux(&mux)?;
        tracing::info!(out = %output.display(), "wrote video");

        Ok(PipelineReport {
            source: info,
            output,
            fps,
            stride,
            stats,
            work_dir: cfg.keep_frames.then(|| work.root().to_path_buf()),
        })
    }

    /// Filter every frame image in `in_dir` into `out_dir`, keeping file names.
    pub fn filter_frames(
        &self,
        in_dir: &Path,
        out_dir: &Path,
        cfg: &FilterConfig,
    ) -> MilkResult<RunStats> {
        let filter = FrameFilter::from_config(cfg)?;
        let frames = FrameSet::scan(in_dir)?;
        if frames.is_empty() {
            return Err(MilkError::directory(format!(
                "no frame images in '{}'",
                in_dir.display()
            )));
        }
        prepare_dir(out_dir, false)?;
        self.filter_set(&frames, out_dir, cfg, filter)
    }

    fn filter_set(
        &self,
        frames: &FrameSet,
        out_dir: &Path,
        cfg: &FilterConfig,
        filter: FrameFilter,
    ) -> MilkResult<RunStats> {
        let ranges = cfg.partition.split(frames.len() as u64, cfg.workers)?;
        FrameScheduler::new(filter, cfg.seed)
            .with_cancel_token(self.cancel.clone())
            .with_progress(self.progress.clone())
            .run(frames, &ranges, out_dir)
    }
}

/// [`Pipeline::filter_frames`] with default backends.
pub fn filter_frames_dir(in_dir: &Path, out_dir: &Path, cfg: &FilterConfig) -> MilkResult<RunStats> {
    Pipeline::ffmpeg().filter_frames(in_dir, out_dir, cfg)
}

/// Filter a single image; writes `filtered_<name>` next to it when `output` is `None`.
///
/// Unlike frame runs, an undecodable input is an error here.
pub fn filter_image_file(
    input: &Path,
    output: Option<&Path>,
    cfg: &FilterConfig,
) -> MilkResult<PathBuf> {
    let filter = FrameFilter::from_config(cfg)?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let frame = read_frame(input, FrameIndex(0), &name)?;

    let mut sampler = DitherSampler::for_worker(cfg.seed, 0);
    let filtered = filter.filter(&frame, &mut sampler)?;

    let out = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_image_output_path(input));
    ensure_parent_dir(&out)?;
    write_frame(&filtered, &out)?;
    Ok(out)
}

/// Scratch directories for one run; removed on drop unless kept.
struct WorkDir {
    root: PathBuf,
    extracted: PathBuf,
    filtered: PathBuf,
    keep: bool,
}

impl WorkDir {
    fn create(root: PathBuf, keep: bool) -> MilkResult<Self> {
        let extracted = root.join(EXTRACTED_DIR);
        let filtered = root.join(FILTERED_DIR);
        prepare_dir(&extracted, true)?;
        prepare_dir(&filtered, true)?;
        Ok(Self {
            root,
            extracted,
            filtered,
            keep,
        })
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn extracted(&self) -> &Path {
        &self.extracted
    }

    fn filtered(&self) -> &Path {
        &self.filtered
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        for dir in [&self.extracted, &self.filtered] {
            if let Err(e) = std::fs::remove_dir_all(dir) {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to remove work dir");
            }
        }
        // Only succeeds if nothing else lives there.
        let _ = std::fs::remove_dir(&self.root);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/run.rs"]
mod tests;
