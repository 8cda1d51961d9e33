//! Brightness to color-band mapping.

/// Band tables for the fixed palette variants.
pub mod table;
