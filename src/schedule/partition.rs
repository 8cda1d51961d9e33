use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{MilkError, MilkResult};

/// How the sorted frame list is split between workers.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PartitionPolicy {
    /// Equal integer chunks; the last worker absorbs the whole remainder.
    #[default]
    Naive,
    /// Remainder spread one frame each over the first workers.
    Balanced,
}

impl PartitionPolicy {
    /// Split `frame_count` frames into `worker_count` ranges under this policy.
    pub fn split(self, frame_count: u64, worker_count: usize) -> MilkResult<Vec<FrameRange>> {
        match self {
            Self::Naive => partition(frame_count, worker_count),
            Self::Balanced => partition_balanced(frame_count, worker_count),
        }
    }
}

/// Split `[0, frame_count)` into `worker_count` contiguous ranges.
///
/// `chunk = frame_count / worker_count`; worker `i < n - 1` gets `[i*chunk, (i+1)*chunk - 1]`
/// and the last worker gets `[(n-1)*chunk, frame_count - 1]`. With more workers than frames
/// every range but the last is empty. One range is returned per worker, empty ones included.
pub fn partition(frame_count: u64, worker_count: usize) -> MilkResult<Vec<FrameRange>> {
    let n = checked_workers(worker_count)?;
    let chunk = frame_count / n;

    (0..n)
        .map(|i| {
            let start = i * chunk;
            let end = if i == n - 1 {
                frame_count
            } else {
                (i + 1) * chunk
            };
            FrameRange::new(FrameIndex(start), FrameIndex(end))
        })
        .collect()
}

/// Like [`partition`], but range lengths differ by at most one frame.
pub fn partition_balanced(frame_count: u64, worker_count: usize) -> MilkResult<Vec<FrameRange>> {
    let n = checked_workers(worker_count)?;
    let base = frame_count / n;
    let extra = frame_count % n;

    let mut out = Vec::with_capacity(worker_count);
    let mut start = 0u64;
    for i in 0..n {
        let len = base + u64::from(i < extra);
        out.push(FrameRange::new(FrameIndex(start), FrameIndex(start + len))?);
        start += len;
    }
    Ok(out)
}

fn checked_workers(worker_count: usize) -> MilkResult<u64> {
    if worker_count == 0 {
        return Err(MilkError::validation("worker count must be >= 1"));
    }
    Ok(worker_count as u64)
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/partition.rs"]
mod tests;
