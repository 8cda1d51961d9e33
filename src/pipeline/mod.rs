//! End-to-end runs: probe, extract, filter, mux.

/// JSON-loadable run settings.
pub mod config;
/// Stage orchestration.
pub mod run;
