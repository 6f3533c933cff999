//! Hann analysis/synthesis window with a clamped inverse.
//!
//! The clipper windows every frame twice: once on analysis (before the
//! forward FFT) and once on synthesis (before overlap-add). The inverse
//! window un-weights a windowed frame so the true sample peak can be
//! measured; it is zeroed where the window is small so that peaks at the
//! frame edges, where `1/w` explodes, are ignored.
//!
//! ```text
//! w[i]     = 0.5 * (1 - cos(2πi / N))        periodic Hann
//! inv_w[i] = 1 / w[i]   if w[i] > 0.1
//!          = 0          otherwise
//! ```
//!
//! With 4× overlap the squared Hann windows sum to a constant 1.5, which the
//! clipper divides out on output.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f32::consts::PI;
use libm::cosf;

/// Window values at or below this floor get an inverse of zero.
pub const INV_WINDOW_FLOOR: f32 = 0.1;

/// Sum of four hop-shifted squared Hann windows (`N/4` hop).
pub const SQUARED_HANN_OVERLAP_GAIN: f32 = 1.5;

/// How [`HannWindow::apply`] writes into the destination frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// `dst[i] = src[i] * w[i]`
    Overwrite,
    /// `dst[i] += src[i] * w[i]` (overlap-add synthesis)
    Accumulate,
}

/// Precomputed periodic Hann window and its clamped inverse.
#[derive(Debug, Clone)]
pub struct HannWindow {
    window: Vec<f32>,
    inv_window: Vec<f32>,
}

impl HannWindow {
    /// Build a window of `size` samples.
    pub fn new(size: usize) -> Self {
        let mut window = Vec::with_capacity(size);
        let mut inv_window = Vec::with_capacity(size);
        for i in 0..size {
            let w = 0.5 * (1.0 - cosf(2.0 * PI * i as f32 / size as f32));
            window.push(w);
            inv_window.push(if w > INV_WINDOW_FLOOR { 1.0 / w } else { 0.0 });
        }
        Self { window, inv_window }
    }

    /// Window length in samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Returns `true` for a zero-length window.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Window coefficients.
    #[inline]
    pub fn coefficients(&self) -> &[f32] {
        &self.window
    }

    /// Clamped inverse coefficients.
    #[inline]
    pub fn inverse(&self) -> &[f32] {
        &self.inv_window
    }

    /// Multiply `src` by the window into `dst`.
    ///
    /// Both slices must be exactly [`len`](Self::len) long.
    #[inline]
    pub fn apply(&self, src: &[f32], dst: &mut [f32], mode: WindowMode) {
        debug_assert_eq!(src.len(), self.window.len());
        debug_assert_eq!(dst.len(), self.window.len());
        let iter = dst.iter_mut().zip(src.iter().zip(self.window.iter()));
        match mode {
            WindowMode::Overwrite => {
                for (d, (&s, &w)) in iter {
                    *d = s * w;
                }
            }
            WindowMode::Accumulate => {
                for (d, (&s, &w)) in iter {
                    *d += s * w;
                }
            }
        }
    }

    /// Peak of a windowed frame after undoing the window, divided by `level`.
    ///
    /// Samples where the inverse is clamped to zero do not contribute.
    #[inline]
    pub fn unwindowed_peak(&self, frame: &[f32], level: f32) -> f32 {
        let peak = frame
            .iter()
            .zip(self.inv_window.iter())
            .fold(0.0_f32, |acc, (&x, &inv)| acc.max((x * inv).abs()));
        peak / level
    }
}
