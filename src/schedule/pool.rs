use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rayon::prelude::*;

use crate::dither::sampler::DitherSampler;
use crate::filter::engine::FrameFilter;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{MilkError, MilkResult};
use crate::media::frames::{FrameSet, read_frame, write_frame};

/// Cooperative cancellation flag, checked by workers between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// New, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every worker to stop after its current frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// `true` once [`CancelToken::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Count of frames finished (written or skipped) across all workers.
#[derive(Clone, Debug, Default)]
pub struct Progress {
    done: Arc<AtomicU64>,
    total: Arc<AtomicU64>,
}

impl Progress {
    /// New, zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames finished so far.
    pub fn get(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    /// Frames the current run covers; zero before a run starts.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    fn bump(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }

    fn reset(&self, total: u64) {
        self.done.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }
}

/// Outcome of a [`FrameScheduler::run`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Frames covered by the supplied ranges.
    pub frames_total: u64,
    /// Frames filtered and written.
    pub frames_written: u64,
    /// Frames skipped because they could not be decoded.
    pub frames_skipped: u64,
    /// Names of the skipped frames, in worker then frame order.
    pub skipped: Vec<String>,
    /// Workers that received a non-empty range.
    pub workers_used: usize,
}

#[derive(Debug, Default)]
struct RangeStats {
    written: u64,
    skipped: Vec<String>,
    interrupted: bool,
}

enum FrameOutcome {
    Written,
    Skipped,
}

/// Runs the filter over fixed frame ranges, one worker per non-empty range.
///
/// Workers share the frame list and the filter read-only; each owns its [`DitherSampler`].
/// Within a range frames are processed in increasing index order. Outputs keep their input
/// file names, so completion order between workers does not matter.
#[derive(Debug)]
pub struct FrameScheduler {
    filter: FrameFilter,
    seed: Option<u64>,
    cancel: CancelToken,
    progress: Progress,
}

impl FrameScheduler {
    /// Scheduler for `filter`; `seed` feeds the per-worker generators.
    pub fn new(filter: FrameFilter, seed: Option<u64>) -> Self {
        Self {
            filter,
            seed,
            cancel: CancelToken::new(),
            progress: Progress::default(),
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Report progress through an externally owned handle.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Handle for polling progress from another thread.
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    /// Handle for cancelling a run from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Filter every frame in `ranges`, writing results into `out_dir`.
    ///
    /// Blocks until every worker has returned. Undecodable frames are skipped and reported in
    /// [`RunStats`]. The first hard error stops the remaining workers between frames and is
    /// returned; an external cancel yields [`MilkError::Cancelled`].
    #[tracing::instrument(skip_all, fields(frames = frames.len(), ranges = ranges.len()))]
    pub fn run(
        &self,
        frames: &FrameSet,
        ranges: &[FrameRange],
        out_dir: &Path,
    ) -> MilkResult<RunStats> {
        for r in ranges {
            if r.end.0 > frames.len() as u64 {
                return Err(MilkError::validation(format!(
                    "range {r} exceeds frame count {}",
                    frames.len()
                )));
            }
        }

        let work: Vec<(usize, FrameRange)> = ranges
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, r)| !r.is_empty())
            .collect();

        let mut stats = RunStats {
            frames_total: ranges.iter().map(|r| r.len_frames()).sum(),
            workers_used: work.len(),
            ..RunStats::default()
        };
        if work.is_empty() {
            return Ok(stats);
        }

        self.progress.reset(stats.frames_total);
        let abort = AtomicBool::new(false);
        let pool = build_thread_pool(work.len())?;
        let results: Vec<MilkResult<RangeStats>> = pool.install(|| {
            work.par_iter()
                .with_max_len(1)
                .map(|&(worker, range)| self.run_range(worker, range, frames, out_dir, &abort))
                .collect()
        });

        let mut first_err = None;
        let mut interrupted = false;
        for res in results {
            match res {
                Ok(rs) => {
                    stats.frames_written += rs.written;
                    stats.frames_skipped += rs.skipped.len() as u64;
                    stats.skipped.extend(rs.skipped);
                    interrupted |= rs.interrupted;
                }
                Err(e) if first_err.is_none() => first_err = Some(e),
                Err(_) => {}
            }
        }

        if let Some(e) = first_err {
            return Err(e);
        }
        if interrupted && self.cancel.is_cancelled() {
            return Err(MilkError::Cancelled);
        }

        tracing::info!(
            written = stats.frames_written,
            skipped = stats.frames_skipped,
            workers = stats.workers_used,
            "filter run finished"
        );
        Ok(stats)
    }

    fn run_range(
        &self,
        worker: usize,
        range: FrameRange,
        frames: &FrameSet,
        out_dir: &Path,
        abort: &AtomicBool,
    ) -> MilkResult<RangeStats> {
        tracing::debug!(worker, %range, "worker started");
        let mut sampler = DitherSampler::for_worker(self.seed, worker);
        let mut rs = RangeStats::default();

        for idx in range.iter() {
            if self.cancel.is_cancelled() || abort.load(Ordering::Relaxed) {
                rs.interrupted = true;
                break;
            }
            match self.process_frame(idx, frames, out_dir, &mut sampler) {
                Ok(FrameOutcome::Written) => rs.written += 1,
                Ok(FrameOutcome::Skipped) => {
                    if let Some(name) = frames.name(idx) {
                        rs.skipped.push(name.to_string());
                    }
                }
                Err(e) => {
                    abort.store(true, Ordering::Relaxed);
                    tracing::error!(worker, frame = idx.0, error = %e, "worker failed");
                    return Err(e);
                }
            }
            self.progress.bump();
        }

        tracing::debug!(worker, written = rs.written, skipped = rs.skipped.len(), "worker done");
        Ok(rs)
    }

    fn process_frame(
        &self,
        idx: FrameIndex,
        frames: &FrameSet,
        out_dir: &Path,
        sampler: &mut DitherSampler,
    ) -> MilkResult<FrameOutcome> {
        let (Some(name), Some(path)) = (frames.name(idx), frames.path(idx)) else {
            return Err(MilkError::validation(format!(
                "frame index {} out of bounds",
                idx.0
            )));
        };

        let frame = match read_frame(&path, idx, name) {
            Ok(frame) => frame,
            Err(e) if e.is_frame_recoverable() => {
                tracing::warn!(frame = name, error = %e, "skipping unreadable frame");
                return Ok(FrameOutcome::Skipped);
            }
            Err(e) => return Err(e),
        };

        let filtered = self.filter.filter(&frame, sampler)?;
        write_frame(&filtered, &out_dir.join(name))?;
        Ok(FrameOutcome::Written)
    }
}

fn build_thread_pool(threads: usize) -> MilkResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(MilkError::validation("worker pool needs at least one thread"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("milktone-worker-{i}"))
        .build()
        .map_err(|e| MilkError::filter(format!("failed to build worker pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/pool.rs"]
mod tests;
