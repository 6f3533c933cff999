//! Delay estimation between a reference and a processed signal.
//!
//! The correlation for every lag comes from one zero-padded FFT pair:
//!
//! ```text
//! R(τ) = Σ x[n] · y[n + τ] = IFFT( conj(X) · Y )[τ]
//! ```

use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

/// Cross-correlation of `reference` and `processed` for lags `0..=max_lag`.
///
/// Entry `τ` is `Σ reference[n] · processed[n + τ]`. Lags past the end of
/// `processed` read 0. Both signals are zero-padded to at least
/// `reference.len() + processed.len() - 1` so the circular product does not
/// wrap.
pub fn cross_correlation(reference: &[f32], processed: &[f32], max_lag: usize) -> Vec<f32> {
    let padded = (reference.len() + processed.len())
        .saturating_sub(1)
        .max(2)
        .next_power_of_two();

    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(padded);
    let inverse = planner.plan_fft_inverse(padded);

    let to_complex = |signal: &[f32]| {
        let mut buf: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
        buf.resize(padded, Complex::default());
        buf
    };
    let mut x = to_complex(reference);
    let mut y = to_complex(processed);
    forward.process(&mut x);
    forward.process(&mut y);

    for (cx, cy) in x.iter_mut().zip(&y) {
        *cx = cx.conj() * cy;
    }
    inverse.process(&mut x);

    let norm = 1.0 / padded as f32;
    (0..=max_lag)
        .map(|lag| {
            if lag < processed.len() {
                x[lag].re * norm
            } else {
                0.0
            }
        })
        .collect()
}

/// Lag in samples (0..=`max_lag`) at which `processed` best matches `reference`.
///
/// Picks the largest positive correlation. Returns `None` when either signal
/// is silent.
pub fn estimate_delay(reference: &[f32], processed: &[f32], max_lag: usize) -> Option<usize> {
    let energy = |s: &[f32]| s.iter().map(|x| x * x).sum::<f32>();
    if energy(reference) < 1e-12 || energy(processed) < 1e-12 {
        return None;
    }

    cross_correlation(reference, processed, max_lag)
        .iter()
        .enumerate()
        .filter(|&(_, &r)| r > 0.0)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(lag, _)| lag)
}
