//! Level measurements: peak, RMS and crest factor.

/// Linear RMS level. Empty input reads 0.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    let energy: f64 = signal.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    (energy / signal.len() as f64).sqrt() as f32
}

/// Largest absolute sample value.
pub fn peak(signal: &[f32]) -> f32 {
    psyclip_core::peak_abs(signal)
}

/// Peak-to-RMS ratio. A full-cycle sine reads √2 (3 dB); silence reads 0.
pub fn crest_factor(signal: &[f32]) -> f32 {
    match rms(signal) {
        level if level > 1e-10 => peak(signal) / level,
        _ => 0.0,
    }
}
