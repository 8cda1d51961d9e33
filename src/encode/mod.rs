//! Reassembling filtered frames into a video.
//!
//! Encoders consume a flat directory of filtered frames in file-name order.

/// `ffmpeg`-based muxer (H.264/AAC via system `ffmpeg`).
pub mod ffmpeg;
/// Encoder trait and request type.
pub mod muxer;
