//! Level conversions and small numeric helpers shared by the clipper.
//!
//! All functions are allocation-free and `no_std` compatible.
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//! - [`is_power_of_two`] - FFT size precondition
//! - [`peak_abs`] - Largest absolute sample of a slice

use libm::{expf, fabsf, logf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use psyclip_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Inputs at or below `1e-10` are floored so silence maps to -200 dB instead of `-inf`.
///
/// # Example
/// ```rust
/// use psyclip_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Returns `true` if `n` is a non-zero power of two.
#[inline]
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && n & (n - 1) == 0
}

/// Largest absolute value in `samples` (0.0 for an empty slice).
#[inline]
pub fn peak_abs(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0_f32, |acc, &s| acc.max(fabsf(s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_roundtrip() {
        for db in [-60.0_f32, -20.0, -6.0, 0.0, 6.0, 14.0, 20.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 1e-3, "{db} dB came back as {back}");
        }
    }

    #[test]
    fn test_one_db_step() {
        // The adaptive mask step is 1.122, i.e. +1 dB
        assert!((db_to_linear(1.0) - 1.122).abs() < 1e-3);
    }

    #[test]
    fn test_silence_is_floored() {
        assert!((linear_to_db(0.0) - (-200.0)).abs() < 0.01);
    }

    #[test]
    fn test_power_of_two() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(2048));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(1000));
        assert!(!is_power_of_two(2049));
    }

    #[test]
    fn test_peak_abs() {
        assert_eq!(peak_abs(&[]), 0.0);
        assert_eq!(peak_abs(&[0.25, -0.75, 0.5]), 0.75);
    }
}
