//! Fixed-precision rounding for display-stable output

/// Round half away from zero to `precision` decimal digits
pub fn round_to(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    let rounded = (value * scale).round() / scale;
    // Avoid writing "-0" for tiny negative noise
    if rounded == 0.0 { 0.0 } else { rounded }
}
