//! Real FFT interface with a fixed packed spectrum layout.
//!
//! The clipper only needs a fixed-size real-to-complex transform and its
//! inverse. Any backend can be plugged in through [`RealFft`] as long as it
//! reproduces the packed layout below exactly; the mask and limiter address
//! bins by index, so a different packing silently miscomputes the mask.
//!
//! # Packed Layout
//!
//! For a transform of size `N` the spectrum occupies `N` floats:
//!
//! | Index | Content |
//! |-------|---------|
//! | `0` | DC bin (real only) |
//! | `1` | Nyquist bin `N/2` (real only) |
//! | `2k`, `2k+1` | real, imaginary part of bin `k`, `0 < k < N/2` |
//!
//! The inverse is unnormalized: `inverse(forward(x)) == N * x`.
//!
//! # Magnitude Convention
//!
//! Bins strictly between DC and Nyquist stand in for both their positive and
//! negative frequency, so [`packed_magnitude`] doubles them. DC and Nyquist
//! are reported as plain absolute values.

use libm::{fabsf, hypotf};

/// Fixed-size real FFT producing and consuming the packed layout.
///
/// Implementations must not allocate in [`forward`](Self::forward) or
/// [`inverse`](Self::inverse); scratch space is sized at construction.
pub trait RealFft {
    /// Transform size `N` (number of real samples).
    fn size(&self) -> usize;

    /// Forward transform of `input` (`N` samples) into `spectrum` (`N` packed floats).
    fn forward(&mut self, input: &[f32], spectrum: &mut [f32]);

    /// Unnormalized inverse of a packed `spectrum` into `output` (`N` samples).
    fn inverse(&mut self, spectrum: &[f32], output: &mut [f32]);
}

/// One-sided magnitude of `bin` in a packed spectrum.
///
/// `bin` ranges over `0..=N/2`. Intermediate bins are doubled to account for
/// the dropped negative frequency.
#[inline]
pub fn packed_magnitude(spectrum: &[f32], bin: usize) -> f32 {
    let half = spectrum.len() / 2;
    if bin == 0 {
        fabsf(spectrum[0])
    } else if bin == half {
        fabsf(spectrum[1])
    } else {
        hypotf(spectrum[2 * bin], spectrum[2 * bin + 1]) * 2.0
    }
}

/// Multiply `bin` of a packed spectrum by `gain`, preserving its phase.
#[inline]
pub fn scale_packed_bin(spectrum: &mut [f32], bin: usize, gain: f32) {
    let half = spectrum.len() / 2;
    if bin == 0 {
        spectrum[0] *= gain;
    } else if bin == half {
        spectrum[1] *= gain;
    } else {
        spectrum[2 * bin] *= gain;
        spectrum[2 * bin + 1] *= gain;
    }
}

#[cfg(feature = "std")]
pub use rustfft_backend::RustRealFft;

#[cfg(feature = "std")]
mod rustfft_backend {
    use super::RealFft;
    use rustfft::num_complex::Complex;
    use rustfft::{Fft, FftPlanner};
    use std::sync::Arc;

    /// [`RealFft`] backed by `rustfft`'s complex transform.
    ///
    /// Real input is promoted into a preallocated complex buffer; the
    /// inverse rebuilds the conjugate-symmetric half before transforming.
    /// Both directions run in place with shared scratch, so steady-state
    /// calls never allocate.
    #[derive(Clone)]
    pub struct RustRealFft {
        size: usize,
        forward: Arc<dyn Fft<f32>>,
        inverse: Arc<dyn Fft<f32>>,
        buffer: Vec<Complex<f32>>,
        scratch: Vec<Complex<f32>>,
    }

    impl RustRealFft {
        /// Plan forward and inverse transforms of `size` samples.
        pub fn new(size: usize) -> Self {
            let mut planner = FftPlanner::new();
            let forward = planner.plan_fft_forward(size);
            let inverse = planner.plan_fft_inverse(size);
            let scratch_len = forward
                .get_inplace_scratch_len()
                .max(inverse.get_inplace_scratch_len());

            Self {
                size,
                forward,
                inverse,
                buffer: vec![Complex::new(0.0, 0.0); size],
                scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            }
        }
    }

    impl core::fmt::Debug for RustRealFft {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.debug_struct("RustRealFft").field("size", &self.size).finish()
        }
    }

    impl RealFft for RustRealFft {
        fn size(&self) -> usize {
            self.size
        }

        fn forward(&mut self, input: &[f32], spectrum: &mut [f32]) {
            debug_assert_eq!(input.len(), self.size);
            debug_assert_eq!(spectrum.len(), self.size);
            for (c, &x) in self.buffer.iter_mut().zip(input) {
                *c = Complex::new(x, 0.0);
            }

            let need = self.forward.get_inplace_scratch_len();
            self.forward
                .process_with_scratch(&mut self.buffer, &mut self.scratch[..need]);

            let half = self.size / 2;
            spectrum[0] = self.buffer[0].re;
            spectrum[1] = self.buffer[half].re;
            for k in 1..half {
                spectrum[2 * k] = self.buffer[k].re;
                spectrum[2 * k + 1] = self.buffer[k].im;
            }
        }

        fn inverse(&mut self, spectrum: &[f32], output: &mut [f32]) {
            debug_assert_eq!(spectrum.len(), self.size);
            debug_assert_eq!(output.len(), self.size);
            let n = self.size;
            let half = n / 2;
            self.buffer[0] = Complex::new(spectrum[0], 0.0);
            self.buffer[half] = Complex::new(spectrum[1], 0.0);
            for k in 1..half {
                let c = Complex::new(spectrum[2 * k], spectrum[2 * k + 1]);
                self.buffer[k] = c;
                self.buffer[n - k] = c.conj();
            }

            let need = self.inverse.get_inplace_scratch_len();
            self.inverse
                .process_with_scratch(&mut self.buffer, &mut self.scratch[..need]);

            for (out, c) in output.iter_mut().zip(self.buffer.iter()) {
                *out = c.re;
            }
        }
    }
}
