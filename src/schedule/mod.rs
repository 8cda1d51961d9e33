//! Frame partitioning and the parallel worker pool.

/// Splitting the frame list into per-worker ranges.
pub mod partition;
/// Worker pool that filters frame ranges concurrently.
pub mod pool;
