//! Frame filter engine.

/// Filter and worker configuration.
pub mod config;
/// Palette quantizer.
pub mod engine;
/// In-memory frame buffers.
pub mod frame;
/// Optional lossy pre-step.
pub mod recompress;
