//! Frame extraction and the flat frame-directory layout.

/// Decoding a source video into frame images.
pub mod extract;
/// Frame directory scanning and frame image I/O.
pub mod frames;
/// `ffprobe` stream facts.
pub mod probe;
