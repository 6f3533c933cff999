//! Per-frequency headroom curve.
//!
//! The margin curve divides the psychoacoustic mask: a margin of +20 dB at a
//! bin means distortion must stay 20 dB below what the masking model alone
//! would allow there. It is specified as (Hz, dB) control points and
//! expanded once into a linear gain per FFT bin.
//!
//! Between two control points the dB value is linearly interpolated in Hz.
//! Bins below the first point take the first point's dB, bins above the last
//! point take the last point's dB.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::ClipperError;
use crate::math::db_to_linear;

/// A single margin control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarginPoint {
    /// Frequency in Hz.
    pub hz: u32,
    /// Headroom in dB.
    pub db: i32,
}

impl MarginPoint {
    /// Create a control point.
    pub const fn new(hz: u32, db: i32) -> Self {
        Self { hz, db }
    }
}

impl From<(u32, i32)> for MarginPoint {
    fn from((hz, db): (u32, i32)) -> Self {
        Self { hz, db }
    }
}

/// Default curve: generous headroom in the midrange where the ear is most
/// sensitive, relaxing towards the top octave.
pub const DEFAULT_MARGIN_CURVE: [MarginPoint; 10] = [
    MarginPoint::new(0, 14),
    MarginPoint::new(125, 14),
    MarginPoint::new(250, 16),
    MarginPoint::new(500, 18),
    MarginPoint::new(1000, 20),
    MarginPoint::new(2000, 20),
    MarginPoint::new(4000, 20),
    MarginPoint::new(8000, 15),
    MarginPoint::new(16000, 5),
    MarginPoint::new(20000, -10),
];

/// Interpolated headroom in dB at `hz`.
///
/// `points` must be non-empty and sorted by frequency; neither is checked
/// beyond a debug assertion.
pub fn margin_db_at(points: &[MarginPoint], hz: f32) -> f32 {
    debug_assert!(!points.is_empty());
    let first = points[0];
    if hz <= first.hz as f32 {
        return first.db as f32;
    }
    for pair in points.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if hz < hi.hz as f32 {
            let span = hi.hz as f32 - lo.hz as f32;
            if span <= 0.0 {
                return hi.db as f32;
            }
            let t = (hz - lo.hz as f32) / span;
            return lo.db as f32 + t * (hi.db - lo.db) as f32;
        }
    }
    points[points.len() - 1].db as f32
}

/// Margin curve expanded to linear gain per FFT bin (`fft_size / 2 + 1` bins).
#[derive(Debug, Clone)]
pub struct MarginCurve {
    gains: Vec<f32>,
}

impl MarginCurve {
    /// Expand `points` for the given sample rate and FFT size.
    pub fn new(
        points: &[MarginPoint],
        sample_rate: u32,
        fft_size: usize,
    ) -> Result<Self, ClipperError> {
        let mut curve = Self {
            gains: vec![1.0; fft_size / 2 + 1],
        };
        curve.rebuild(points, sample_rate, fft_size)?;
        Ok(curve)
    }

    /// Recompute the per-bin gains in place.
    ///
    /// Does not allocate as long as `fft_size` is unchanged.
    pub fn rebuild(
        &mut self,
        points: &[MarginPoint],
        sample_rate: u32,
        fft_size: usize,
    ) -> Result<(), ClipperError> {
        if points.is_empty() {
            return Err(ClipperError::EmptyMarginCurve);
        }
        self.gains.resize(fft_size / 2 + 1, 1.0);
        let bin_hz = sample_rate as f32 / fft_size as f32;
        for (bin, gain) in self.gains.iter_mut().enumerate() {
            *gain = db_to_linear(margin_db_at(points, bin as f32 * bin_hz));
        }
        Ok(())
    }

    /// Per-bin linear gains.
    #[inline]
    pub fn gains(&self) -> &[f32] {
        &self.gains
    }

    /// Number of bins.
    #[inline]
    pub fn len(&self) -> usize {
        self.gains.len()
    }

    /// Returns `true` if the curve has no bins.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }
}
