//! Axis quantization
//!
//! Converts a raw axis sample in [-1.0, 1.0] into a discrete step (0..=levels)
//! or bucket (0..buckets). Both functions are total: out-of-range and NaN
//! samples clamp, and callers guarantee `levels`/`buckets` > 0 (checked when the
//! profile is loaded).

/// Bias that keeps exact boundaries from flickering between neighbours
const EPSILON: f64 = 1e-9;

/// Map [-1, 1] to [0, 1], negating first when inverted
fn normalize(value: f32, invert: bool) -> f64 {
    let v = if value.is_nan() { 0.0 } else { f64::from(value) };
    let v = if invert { -v } else { v };
    ((v + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Quantize to a step in `0..=levels` (`levels + 1` positions)
pub fn to_step(value: f32, levels: u32, invert: bool) -> u32 {
    let scaled = normalize(value, invert) * f64::from(levels) + EPSILON;
    (scaled as u32).min(levels)
}

/// Quantize to a bucket in `0..buckets`
///
/// The negative bias keeps 1.0 inside the last bucket.
pub fn to_bucket(value: f32, buckets: u32, invert: bool) -> u32 {
    let scaled = normalize(value, invert) * f64::from(buckets) - EPSILON;
    // `as` saturates negatives to 0
    (scaled as u32).min(buckets.saturating_sub(1))
}
