//! Per-bin distortion ceiling derived from the signal spectrum.
//!
//! The mask curve answers "how much distortion can bin `k` hold before it
//! becomes audible?". It is the signal's own magnitude spectrum, smeared by
//! the [`SpreadTable`] for psychoacoustic bins, copied as-is for bins above
//! them, and finally divided by the [`MarginCurve`].
//!
//! [`limit_spectrum`] then enforces the ceiling on a distortion spectrum by
//! scaling each offending bin down to exactly the mask, phase intact.

use crate::margin::MarginCurve;
use crate::spread::SpreadTable;
use crate::transform::{packed_magnitude, scale_packed_bin};

/// Compute the mask curve of a packed `spectrum` into `mask` (`N/2 + 1` bins).
///
/// Does not allocate.
pub fn compute_mask_curve(
    spectrum: &[f32],
    spread: &SpreadTable,
    margin: &MarginCurve,
    mask: &mut [f32],
) {
    debug_assert_eq!(mask.len(), spectrum.len() / 2 + 1);
    debug_assert_eq!(mask.len(), margin.len());

    mask.fill(0.0);

    let psy_bins = spread.num_psy_bins().min(mask.len());
    for bin in 0..psy_bins {
        let magnitude = packed_magnitude(spectrum, bin);
        spread.spread_into(bin, magnitude, mask);
    }

    // Ultrasonic bins: no spreading, raw magnitude
    for bin in psy_bins..mask.len() {
        mask[bin] = packed_magnitude(spectrum, bin);
    }

    for (m, &gain) in mask.iter_mut().zip(margin.gains()) {
        *m /= gain;
    }
}

/// Scale every bin of a packed distortion `spectrum` whose one-sided
/// magnitude exceeds `mask` down to the mask.
///
/// A zero mask silences the bin. Does not allocate.
pub fn limit_spectrum(spectrum: &mut [f32], mask: &[f32]) {
    debug_assert_eq!(mask.len(), spectrum.len() / 2 + 1);
    for (bin, &ceiling) in mask.iter().enumerate() {
        let magnitude = packed_magnitude(spectrum, bin);
        if magnitude > ceiling {
            scale_packed_bin(spectrum, bin, ceiling / magnitude);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::margin::{DEFAULT_MARGIN_CURVE, MarginPoint};

    fn flat_margin(fft_size: usize) -> MarginCurve {
        MarginCurve::new(&[MarginPoint::new(0, 0)], 48_000, fft_size).unwrap()
    }

    #[test]
    fn test_silence_gives_zero_mask() {
        let n = 64;
        let spread = SpreadTable::new(n / 2);
        let spectrum = vec![0.0_f32; n];
        let mut mask = vec![1.0_f32; n / 2 + 1];
        compute_mask_curve(&spectrum, &spread, &flat_margin(n), &mut mask);
        assert!(mask.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_single_tone_spreads_around_bin() {
        let n = 256;
        let spread = SpreadTable::new(n / 2);
        let mut spectrum = vec![0.0_f32; n];
        // bin 40: re = 1, im = 0 → one-sided magnitude 2
        spectrum[80] = 1.0;
        let mut mask = vec![0.0_f32; n / 2 + 1];
        compute_mask_curve(&spectrum, &spread, &flat_margin(n), &mut mask);

        let total: f32 = mask.iter().sum();
        assert!((total - 2.0).abs() < 1e-4, "total = {total}");
        assert!(mask[40] > mask[39] && mask[40] > mask[41]);
        // Far from the tone nothing is masked
        assert_eq!(mask[10], 0.0);
        assert_eq!(mask[100], 0.0);
    }

    #[test]
    fn test_ultrasonic_bins_copy_magnitude() {
        let n = 64;
        // Only the lower quarter of bins is psychoacoustic
        let spread = SpreadTable::new(n / 8);
        let mut spectrum = vec![0.0_f32; n];
        spectrum[2 * 20] = 3.0;
        spectrum[2 * 20 + 1] = 4.0;
        spectrum[1] = -0.5; // Nyquist
        let mut mask = vec![0.0_f32; n / 2 + 1];
        compute_mask_curve(&spectrum, &spread, &flat_margin(n), &mut mask);
        assert!((mask[20] - 10.0).abs() < 1e-5);
        assert!((mask[32] - 0.5).abs() < 1e-6);
        assert_eq!(mask[21], 0.0);
    }

    #[test]
    fn test_margin_divides_mask() {
        let n = 64;
        let spread = SpreadTable::new(n / 8);
        let mut spectrum = vec![0.0_f32; n];
        spectrum[2 * 20] = 1.0;
        let margin = MarginCurve::new(&[MarginPoint::new(0, 20)], 48_000, n).unwrap();
        let mut mask = vec![0.0_f32; n / 2 + 1];
        compute_mask_curve(&spectrum, &spread, &margin, &mut mask);
        // 2.0 magnitude, 20 dB margin → 0.2
        assert!((mask[20] - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_default_margin_keeps_mask_finite() {
        let n = 512;
        let spread = SpreadTable::new(n / 2);
        let margin = MarginCurve::new(&DEFAULT_MARGIN_CURVE, 44_100, n).unwrap();
        let spectrum: Vec<f32> = (0..n).map(|i| ((i * 7) % 13) as f32 - 6.0).collect();
        let mut mask = vec![0.0_f32; n / 2 + 1];
        compute_mask_curve(&spectrum, &spread, &margin, &mut mask);
        assert!(mask.iter().all(|m| m.is_finite() && *m >= 0.0));
    }

    #[test]
    fn test_limit_scales_to_ceiling() {
        let mut spectrum = vec![0.0_f32; 16];
        spectrum[0] = -4.0; // DC
        spectrum[1] = 0.1; // Nyquist, under its ceiling
        spectrum[6] = 3.0; // bin 3: |.|*2 = 10
        spectrum[7] = 4.0;
        let mut mask = vec![1.0_f32; 9];
        mask[3] = 5.0;
        limit_spectrum(&mut spectrum, &mask);

        assert!((spectrum[0] + 1.0).abs() < 1e-6);
        assert_eq!(spectrum[1], 0.1);
        // Scaled by 0.5, phase kept
        assert!((spectrum[6] - 1.5).abs() < 1e-6);
        assert!((spectrum[7] - 2.0).abs() < 1e-6);
        assert!((packed_magnitude(&spectrum, 3) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_mask_silences() {
        let mut spectrum = vec![1.0_f32; 16];
        let mask = vec![0.0_f32; 9];
        limit_spectrum(&mut spectrum, &mask);
        assert!(spectrum.iter().all(|&x| x == 0.0));
    }
}
