//! Numeric helpers shared by the allocator and table builder
//!
//! - Normalization: tolerant rescale of a row towards 100%
//! - Rounding: fixed decimal precision for output stability

pub mod normalization;
pub mod rounding;

pub use normalization::{tolerant_rescale, DEFAULT_TARGET, DEFAULT_TOLERANCE};
pub use rounding::round_to;
