//! Psychoacoustic spreading model.
//!
//! A loud spectral component masks distortion at nearby frequencies. The
//! spread table approximates this with a tent in log-frequency, log-amplitude
//! space around each bin: shallow towards higher frequencies (upward masking)
//! and steep towards lower ones.
//!
//! ```text
//! weight(j; i) = exp(-k * |ln((j + 0.5) / (i + 0.5))|)
//!     k = 40   for j >= i   (mask up)
//!     k = 80   for j <  i   (mask down)
//! ```
//!
//! # Cost Bounds
//!
//! Two approximations keep the mask computation close to linear in the
//! frame size:
//!
//! 1. Each tent only covers `[i*3/4, ((i+1)*4+2)/3)`, roughly one critical band.
//!    Contributions further away are negligible.
//! 2. Tents are only computed for a geometric subset of bins (one per bin up
//!    to bin 1, then the step doubles at every power of two: about two rows
//!    per octave) and reused for the bins in between by indexing relative to
//!    the bin's own position.
//!
//! Each row is `num_psy_bins` wide (at least 4) and stored centred at half its
//! width, so a weight for bin `j` seen from bin `i` lives at
//! `row_start + width / 2 + (j - i)`.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::{expf, fabsf, logf};

/// Narrowest row width; tiny tables would otherwise overrun their row.
const MIN_ROW_WIDTH: usize = 4;

/// Upward masking slope.
const MASK_UP_SLOPE: f32 = 40.0;

/// Downward masking slope.
const MASK_DOWN_SLOPE: f32 = 80.0;

/// Number of bins that take part in the spreading model.
///
/// Higher sample rates push more bins into the ultrasonic range, where
/// masking is not modelled; those bins fall back to their raw magnitude.
///
/// | Sample rate | Psychoacoustic bins |
/// |-------------|---------------------|
/// | ≤ 50 kHz | `fft_size / 2` |
/// | ≤ 100 kHz | `fft_size / 4` |
/// | above | `fft_size / 8` |
pub fn psy_bin_count(sample_rate: u32, fft_size: usize) -> usize {
    if sample_rate <= 50_000 {
        fft_size / 2
    } else if sample_rate <= 100_000 {
        fft_size / 4
    } else {
        fft_size / 8
    }
}

/// Half-open range of bin offsets `[start, end)` relative to the masking bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpreadRange {
    /// First offset (zero or negative).
    pub start: isize,
    /// One past the last offset (positive).
    pub end: isize,
}

/// Precomputed, normalized masking rows shared across bins.
#[derive(Debug, Clone)]
pub struct SpreadTable {
    num_psy_bins: usize,
    row_width: usize,
    weights: Vec<f32>,
    ranges: Vec<SpreadRange>,
    index: Vec<usize>,
}

impl SpreadTable {
    /// Build the table for `num_psy_bins` bins.
    pub fn new(num_psy_bins: usize) -> Self {
        let mut weights = Vec::new();
        let mut ranges = Vec::new();
        let mut index = vec![0; num_psy_bins];
        let row_width = num_psy_bins.max(MIN_ROW_WIDTH);
        let centre = row_width / 2;

        let mut bin = 0;
        let mut increment = 1;
        while bin < num_psy_bins {
            let row = ranges.len();
            let base = row * row_width;
            weights.resize(base + row_width, 0.0);

            let start_bin = bin * 3 / 4;
            let end_bin = num_psy_bins.min(((bin + 1) * 4 + 2) / 3);

            let mut sum = 0.0_f32;
            for j in start_bin..end_bin {
                // +0.5 keeps ln() finite for bin 0
                let rel_log = fabsf(logf((j as f32 + 0.5) / (bin as f32 + 0.5)));
                let slope = if j >= bin { MASK_UP_SLOPE } else { MASK_DOWN_SLOPE };
                let value = expf(-rel_log * slope);
                sum += value;
                weights[base + centre + j - bin] = value;
            }
            for j in start_bin..end_bin {
                weights[base + centre + j - bin] /= sum;
            }

            ranges.push(SpreadRange {
                start: start_bin as isize - bin as isize,
                end: end_bin as isize - bin as isize,
            });

            let next_bin = if bin <= 1 {
                bin + 1
            } else {
                if bin.is_power_of_two() {
                    increment = bin / 2;
                }
                bin + increment
            };

            for slot in &mut index[bin..next_bin.min(num_psy_bins)] {
                *slot = row;
            }
            bin = next_bin;
        }

        Self {
            num_psy_bins,
            row_width,
            weights,
            ranges,
            index,
        }
    }

    /// Number of bins covered by the model.
    #[inline]
    pub fn num_psy_bins(&self) -> usize {
        self.num_psy_bins
    }

    /// Number of distinct rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.ranges.len()
    }

    /// Row used by `bin`.
    #[inline]
    pub fn row_for_bin(&self, bin: usize) -> usize {
        self.index[bin]
    }

    /// Declared offset range of `row`.
    #[inline]
    pub fn range(&self, row: usize) -> SpreadRange {
        self.ranges[row]
    }

    /// Weights of `row` over its declared range, lowest offset first.
    pub fn row_weights(&self, row: usize) -> &[f32] {
        let range = self.ranges[row];
        let base = row * self.row_width + self.row_width / 2;
        let start = (base as isize + range.start) as usize;
        let end = (base as isize + range.end) as usize;
        &self.weights[start..end]
    }

    /// Add the masking contribution of `magnitude` at `bin` into `mask`.
    ///
    /// Only the first `num_psy_bins` entries of `mask` are touched.
    #[inline]
    pub fn spread_into(&self, bin: usize, magnitude: f32, mask: &mut [f32]) {
        let row = self.index[bin];
        let range = self.ranges[row];
        let start = (bin as isize + range.start).max(0) as usize;
        let end = (bin as isize + range.end).min(self.num_psy_bins as isize) as usize;
        // weight of bin j lives at base + centre + (j - bin)
        let origin = (row * self.row_width + self.row_width / 2) as isize - bin as isize;
        for j in start..end {
            mask[j] += self.weights[(origin + j as isize) as usize] * magnitude;
        }
    }
}
