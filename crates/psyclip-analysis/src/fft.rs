//! Analysis windows and a planned forward FFT.
//!
//! These are for measuring output, not for the clipper itself, which has its
//! own packed real transform in `psyclip-core`.

use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::TAU;
use std::sync::Arc;

/// Analysis window shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// No taper
    Rectangular,
    /// Periodic Hann
    Hann,
    /// 4-term Blackman-Harris, about -92 dB sidelobes
    BlackmanHarris,
}

impl Window {
    /// Coefficient `i` of an `n`-point periodic window.
    pub fn coefficient(self, i: usize, n: usize) -> f32 {
        let x = TAU * i as f32 / n as f32;
        match self {
            Window::Rectangular => 1.0,
            Window::Hann => 0.5 - 0.5 * x.cos(),
            Window::BlackmanHarris => {
                0.35875 - 0.48829 * x.cos() + 0.14128 * (2.0 * x).cos()
                    - 0.01168 * (3.0 * x).cos()
            }
        }
    }

    /// Multiply `buffer` by the window in place.
    pub fn apply(self, buffer: &mut [f32]) {
        if self == Window::Rectangular {
            return;
        }
        let n = buffer.len();
        for (i, x) in buffer.iter_mut().enumerate() {
            *x *= self.coefficient(i, n);
        }
    }

    /// All `size` coefficients.
    pub fn coefficients(self, size: usize) -> Vec<f32> {
        (0..size).map(|i| self.coefficient(i, size)).collect()
    }

    /// Sum of the coefficients, the magnitude a unit DC input reads at bin 0.
    pub fn coherent_gain(self, size: usize) -> f32 {
        (0..size).map(|i| self.coefficient(i, size)).sum()
    }
}

/// Forward complex FFT of a fixed size, fed with real input.
pub struct Fft {
    plan: Arc<dyn rustfft::Fft<f32>>,
    buffer: Vec<Complex<f32>>,
}

impl Fft {
    /// Plan a forward FFT of `size` points.
    pub fn new(size: usize) -> Self {
        let plan = FftPlanner::new().plan_fft_forward(size);
        Self {
            plan,
            buffer: vec![Complex::default(); size],
        }
    }

    /// Transform length.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// One-sided spectrum (`size / 2 + 1` bins, DC to Nyquist) of `input`.
    ///
    /// `input` is zero-padded or truncated to the transform length. The
    /// returned slice borrows internal storage and is overwritten by the next
    /// call.
    pub fn forward(&mut self, input: &[f32]) -> &[Complex<f32>] {
        let size = self.buffer.len();
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            *slot = Complex::new(input.get(i).copied().unwrap_or(0.0), 0.0);
        }
        self.plan.process(&mut self.buffer);
        &self.buffer[..=size / 2]
    }
}

impl std::fmt::Debug for Fft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft").field("size", &self.size()).finish()
    }
}
