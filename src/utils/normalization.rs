//! Tolerant Normalization
//!
//! Source papers rarely report shares that add up to exactly 100%. Rows whose
//! total falls inside a narrow tolerance band are rescaled to the target;
//! anything outside the band is left untouched so that incomplete or
//! inconsistent reporting stays visible in the harmonized table.

/// Default tolerance band for rescaling (inclusive)
pub const DEFAULT_TOLERANCE: (f64, f64) = (99.0, 101.0);

/// Default normalization target
pub const DEFAULT_TARGET: f64 = 100.0;

/// Rescale `values` in place so they sum to `target`
///
/// Only applied when the current total is nonzero and lies within the closed
/// interval `tolerance`. Returns whether the rescale happened.
pub fn tolerant_rescale(values: &mut [f64], tolerance: (f64, f64), target: f64) -> bool {
    let total: f64 = values.iter().sum();
    let (lo, hi) = tolerance;

    if total == 0.0 || total < lo || total > hi {
        return false;
    }

    let factor = target / total;
    for v in values.iter_mut() {
        *v *= factor;
    }

    true
}
