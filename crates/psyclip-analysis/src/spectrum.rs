//! Spectral measurements
//!
//! Spectra here are one-sided magnitude vectors of `fft_size / 2 + 1` bins,
//! bin `k` sitting at `k * sample_rate / fft_size` Hz.

use crate::fft::{Fft, Window};

/// Compute magnitude spectrum from time-domain signal
///
/// Only the first `fft_size` samples are used; shorter signals are zero-padded.
pub fn magnitude_spectrum(signal: &[f32], fft_size: usize, window: Window) -> Vec<f32> {
    let mut frame: Vec<f32> = signal.iter().take(fft_size).copied().collect();
    frame.resize(fft_size, 0.0);
    window.apply(&mut frame);

    let mut fft = Fft::new(fft_size);
    fft.forward(&frame).iter().map(|c| c.norm()).collect()
}

/// Average power spectrum over 50%-overlapping frames (Welch's method)
///
/// Returns magnitudes (square root of the averaged power). Falls back to a
/// single zero-padded frame when the signal is shorter than `fft_size`.
pub fn welch_spectrum(signal: &[f32], fft_size: usize, window: Window) -> Vec<f32> {
    let hop = (fft_size / 2).max(1);
    let mut fft = Fft::new(fft_size);
    let coeffs = window.coefficients(fft_size);
    let mut power = vec![0.0_f32; fft_size / 2 + 1];
    let mut frames = 0;

    let mut start = 0;
    loop {
        let end = (start + fft_size).min(signal.len());
        let mut frame: Vec<f32> = signal[start..end].to_vec();
        frame.resize(fft_size, 0.0);
        for (x, w) in frame.iter_mut().zip(&coeffs) {
            *x *= w;
        }
        for (p, c) in power.iter_mut().zip(fft.forward(&frame)) {
            *p += c.norm_sqr();
        }
        frames += 1;

        start += hop;
        if start + fft_size > signal.len() {
            break;
        }
    }

    power.iter().map(|p| (p / frames as f32).sqrt()).collect()
}

/// Compute spectral centroid (center of mass of spectrum)
///
/// Returns frequency in Hz
pub fn spectral_centroid(spectrum: &[f32], sample_rate: f32) -> f32 {
    if spectrum.len() < 2 {
        return 0.0;
    }
    let bin_hz = bin_width(spectrum.len(), sample_rate);

    let mut weighted = 0.0_f32;
    let mut total = 0.0_f32;
    for (i, &mag) in spectrum.iter().enumerate() {
        weighted += i as f32 * bin_hz * mag;
        total += mag;
    }

    if total > 1e-10 { weighted / total } else { 0.0 }
}

/// Energy (sum of squared magnitudes) of the bins within `[low_hz, high_hz]`
pub fn band_energy(spectrum: &[f32], sample_rate: f32, low_hz: f32, high_hz: f32) -> f32 {
    if spectrum.len() < 2 {
        return 0.0;
    }
    let bin_hz = bin_width(spectrum.len(), sample_rate);
    spectrum
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let hz = *i as f32 * bin_hz;
            hz >= low_hz && hz <= high_hz
        })
        .map(|(_, &m)| m * m)
        .sum()
}

/// Share of the total energy found within `tolerance_hz` of the first
/// `num_harmonics` multiples of `fundamental_hz` (the fundamental included)
///
/// Returns a value in `[0, 1]`; 0 for a silent spectrum.
pub fn harmonic_energy_ratio(
    spectrum: &[f32],
    sample_rate: f32,
    fundamental_hz: f32,
    num_harmonics: usize,
    tolerance_hz: f32,
) -> f32 {
    if spectrum.len() < 2 {
        return 0.0;
    }
    let bin_hz = bin_width(spectrum.len(), sample_rate);

    let mut harmonic = 0.0_f32;
    let mut total = 0.0_f32;
    for (i, &mag) in spectrum.iter().enumerate() {
        let energy = mag * mag;
        total += energy;

        let hz = i as f32 * bin_hz;
        let nearest = (hz / fundamental_hz).round();
        if nearest >= 1.0
            && nearest <= num_harmonics as f32
            && (hz - nearest * fundamental_hz).abs() <= tolerance_hz
        {
            harmonic += energy;
        }
    }

    if total > 1e-20 { harmonic / total } else { 0.0 }
}

/// Width of one bin in Hz for a one-sided spectrum of `bins` bins.
fn bin_width(bins: usize, sample_rate: f32) -> f32 {
    sample_rate / (2 * (bins - 1)) as f32
}
