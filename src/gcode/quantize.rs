//! Intensity to laser power mapping

/// Intensity of an untouched (pure white) sample
pub const WHITE: u8 = 255;

/// Map an 8-bit intensity to a spindle value in `[0, max_power]`.
///
/// White maps to 0 and black to `max_power`; values in between are rounded
/// to the nearest integer.
pub fn quantize_power(sample: u8, max_power: u32) -> u32 {
    let darkness = 1.0 - sample as f64 / WHITE as f64;
    let power = (darkness * max_power as f64).round();
    (power.max(0.0) as u32).min(max_power)
}
