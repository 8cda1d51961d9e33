//! Per-pixel stochastic blending between adjacent palette colors.

/// Bernoulli sampler and blend probability.
pub mod sampler;
