//! Milktone turns videos into three-colour, dithered "milk" renditions.
//!
//! A run probes the source, extracts frames with `ffmpeg`, filters them in parallel and muxes
//! the result back together with the original audio:
//!
//! - Map each pixel's brightness onto a [`PaletteVariant`] band
//! - Blend boundary bands stochastically through a per-worker [`DitherSampler`]
//! - Split the frame list into contiguous ranges with [`partition`] and run them on a
//!   [`FrameScheduler`]
//! - Drive the whole thing end to end with a [`Pipeline`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Stochastic boundary blending.
pub mod dither;
/// Reassembling filtered frames into a video.
pub mod encode;
/// Per-frame colour filter.
pub mod filter;
/// Probing, extracting and reading frame images.
pub mod media;
/// Brightness palettes.
pub mod palette;
/// End-to-end runs.
pub mod pipeline;
/// Work partitioning and the parallel frame scheduler.
pub mod schedule;

pub use crate::foundation::core::{Fps, FrameIndex, FrameRange, Rgb8, brightness};
pub use crate::foundation::error::{MilkError, MilkResult};

pub use crate::dither::sampler::{BlendProbability, DitherSampler};
pub use crate::encode::ffmpeg::FfmpegMuxer;
pub use crate::encode::muxer::{MuxRequest, VideoEncoder};
pub use crate::filter::config::FilterConfig;
pub use crate::filter::engine::FrameFilter;
pub use crate::filter::frame::{ChannelOrder, Frame};
pub use crate::filter::recompress::{Niceness, recompress};
pub use crate::media::extract::{ExtractRequest, FfmpegDecoder, VideoDecoder};
pub use crate::media::frames::FrameSet;
pub use crate::media::probe::{VideoSourceInfo, probe_video};
pub use crate::palette::table::{BandColor, PaletteBand, PaletteVariant, map_brightness};
pub use crate::pipeline::config::PipelineConfig;
pub use crate::pipeline::run::{Pipeline, PipelineReport, filter_frames_dir, filter_image_file};
pub use crate::schedule::partition::{PartitionPolicy, partition, partition_balanced};
pub use crate::schedule::pool::{CancelToken, FrameScheduler, Progress, RunStats};
