//! Psychoacoustic lookahead clipper.
//!
//! Reduces peaks above a ceiling while keeping the added distortion below
//! what the ear can hear. The signal itself is never altered directly;
//! instead the clipper builds a *clipping delta* per frame, a correction
//! signal whose spectrum is held under a per-bin mask derived from the
//! frame's own spectrum.
//!
//! # Algorithm
//!
//! Each [`feed`](PsyClipper::feed) consumes one hop (`fft_size / 4`) and
//! runs on the latest `fft_size`-sample frame:
//!
//! 1. **Analysis**: window the frame, FFT it, compute the mask curve and the
//!    unwindowed input peak relative to the clip level (`orig_peak`).
//! 2. **Refinement**, `iterations` times:
//!    - clip `windowed + delta` against `±clip_level · w[i]`, adding the
//!      overshoot (boosted ×2 in the last third of rounds once the peak is
//!      below 2) into the delta;
//!    - FFT the delta, scale every bin above the mask down onto it, inverse
//!      FFT and normalize by `1/N`;
//!    - re-measure the peak and grow the mask by a shift factor: at least
//!      +1 dB, more when peaks remain (proportional to the reduction still
//!      needed early on, the full residual peak late or on regression),
//!      damped by the adaptive distortion strength.
//! 3. **Synthesis**: window the delta again and overlap-add it into the
//!    distortion frame. The oldest hop is complete and is emitted divided by
//!    1.5 (the squared-Hann 4× overlap gain), plus the input from the same
//!    hop unless only the distortion was requested.
//!
//! # Latency
//!
//! A sample pushed in call `n` is emitted in call `n + 3`, so the clipper
//! delays by `fft_size - hop` samples.
//!
//! # Real-Time Safety
//!
//! All buffers are sized at construction. `feed` performs `2 × iterations + 1`
//! FFTs of fixed size, never allocates, never logs and never fails. Clipper
//! state is per channel; use one instance per channel.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::ClipperError;
use crate::margin::{DEFAULT_MARGIN_CURVE, MarginCurve, MarginPoint};
use crate::mask::{compute_mask_curve, limit_spectrum};
use crate::math::is_power_of_two;
use crate::overlap::OverlapAddBuffer;
use crate::spread::{SpreadTable, psy_bin_count};
use crate::transform::RealFft;
use crate::window::{HannWindow, SQUARED_HANN_OVERLAP_GAIN, WindowMode};

/// Smallest accepted FFT size.
pub const MIN_FFT_SIZE: usize = 32;

/// Default number of clip-and-filter rounds per hop.
pub const DEFAULT_ITERATIONS: u32 = 6;

/// Default adaptive distortion strength.
pub const DEFAULT_ADAPTIVE_STRENGTH: f32 = 1.0;

/// Clip levels are floored here so the peak ratio stays finite.
pub const MIN_CLIP_LEVEL: f32 = 1e-6;

/// Minimum mask growth per round, +1 dB.
const MASK_SHIFT_STEP: f32 = 1.122;

/// Delta multiplier in the final third of rounds.
const BOOSTED_DELTA: f32 = 2.0;

/// Boosting is skipped while the relative peak is at or above this.
const BOOST_PEAK_LIMIT: f32 = 2.0;

/// FFT size suited to `sample_rate`: 2048 up to 50 kHz, 4096 up to 100 kHz,
/// 8192 above. Keeps the frame near 40 ms at every rate.
pub fn recommended_fft_size(sample_rate: u32) -> usize {
    if sample_rate <= 50_000 {
        2048
    } else if sample_rate <= 100_000 {
        4096
    } else {
        8192
    }
}

/// One channel of psychoacoustic clipping over a pluggable [`RealFft`].
///
/// With the `std` feature, [`Clipper`](crate::Clipper) is this type over the
/// rustfft backend.
///
/// # Example
///
/// ```rust
/// use psyclip_core::Clipper;
///
/// let mut clipper = Clipper::new(44_100, 2048, 1.0).unwrap();
/// let hop = clipper.feed_size();
/// let input = vec![0.5_f32; hop];
/// let mut output = vec![0.0_f32; hop];
/// clipper.feed(&input, &mut output, false, None);
/// ```
#[derive(Debug, Clone)]
pub struct PsyClipper<F: RealFft> {
    sample_rate: u32,
    fft_size: usize,
    clip_level: f32,
    iterations: u32,
    adaptive_strength: f32,

    window: HannWindow,
    frames: OverlapAddBuffer,
    spread: SpreadTable,
    margin_points: Vec<MarginPoint>,
    margin: MarginCurve,

    // Scratch, reused every call
    windowed: Vec<f32>,
    clipping_delta: Vec<f32>,
    spectrum: Vec<f32>,
    mask: Vec<f32>,

    fft: F,
}

impl<F: RealFft> PsyClipper<F> {
    /// Build a clipper around an existing transform.
    ///
    /// `fft.size()` must equal `fft_size`. The default margin curve is
    /// installed; `clip_level` is floored at [`MIN_CLIP_LEVEL`].
    pub fn with_transform(
        sample_rate: u32,
        fft_size: usize,
        clip_level: f32,
        fft: F,
    ) -> Result<Self, ClipperError> {
        if sample_rate == 0 {
            return Err(ClipperError::InvalidSampleRate(sample_rate));
        }
        if !is_power_of_two(fft_size) {
            return Err(ClipperError::FftSizeNotPowerOfTwo(fft_size));
        }
        if fft_size < MIN_FFT_SIZE {
            return Err(ClipperError::FftSizeTooSmall {
                size: fft_size,
                min: MIN_FFT_SIZE,
            });
        }
        if fft.size() != fft_size {
            return Err(ClipperError::TransformSizeMismatch {
                expected: fft_size,
                actual: fft.size(),
            });
        }

        let num_psy_bins = psy_bin_count(sample_rate, fft_size);
        let spread = SpreadTable::new(num_psy_bins);
        let margin = MarginCurve::new(&DEFAULT_MARGIN_CURVE, sample_rate, fft_size)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate,
            fft_size,
            hop = fft_size / 4,
            num_psy_bins,
            spread_rows = spread.row_count(),
            "psyclip: clipper built"
        );

        Ok(Self {
            sample_rate,
            fft_size,
            clip_level: clip_level.max(MIN_CLIP_LEVEL),
            iterations: DEFAULT_ITERATIONS,
            adaptive_strength: DEFAULT_ADAPTIVE_STRENGTH,
            window: HannWindow::new(fft_size),
            frames: OverlapAddBuffer::new(fft_size),
            spread,
            margin_points: DEFAULT_MARGIN_CURVE.to_vec(),
            margin,
            windowed: vec![0.0; fft_size],
            clipping_delta: vec![0.0; fft_size],
            spectrum: vec![0.0; fft_size],
            mask: vec![0.0; fft_size / 2 + 1],
            fft,
        })
    }

    /// Set the linear peak ceiling (1.0 = full scale).
    pub fn set_clip_level(&mut self, clip_level: f32) {
        self.clip_level = clip_level.max(MIN_CLIP_LEVEL);
    }

    /// Set the number of clip-and-filter rounds per hop (at least 1).
    pub fn set_iterations(&mut self, iterations: u32) {
        self.iterations = iterations.max(1);
    }

    /// Set how strongly residual peaks widen the mask, clamped to `[0, 1]`.
    ///
    /// Scales every per-round mask shift towards unity. At 0 the mask never
    /// grows, so the distortion spectrum is respected at the cost of peak
    /// control; at 1 the full shift applies.
    pub fn set_adaptive_distortion_strength(&mut self, strength: f32) {
        self.adaptive_strength = strength.clamp(0.0, 1.0);
    }

    /// Replace the margin curve.
    ///
    /// Points must be sorted by frequency (not checked). Keeps its storage
    /// when the point count does not grow, but is not meant for the audio
    /// thread.
    pub fn set_margin_curve(&mut self, points: &[MarginPoint]) -> Result<(), ClipperError> {
        self.margin.rebuild(points, self.sample_rate, self.fft_size)?;
        self.margin_points.clear();
        self.margin_points.extend_from_slice(points);

        #[cfg(feature = "tracing")]
        tracing::debug!(points = points.len(), "psyclip: margin curve rebuilt");

        Ok(())
    }

    /// Change the sample rate, rebuilding the spread table and margin curve.
    ///
    /// Allocates; call off the audio thread. Sliding frames are kept.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), ClipperError> {
        if sample_rate == 0 {
            return Err(ClipperError::InvalidSampleRate(sample_rate));
        }
        let num_psy_bins = psy_bin_count(sample_rate, self.fft_size);
        if num_psy_bins != self.spread.num_psy_bins() {
            self.spread = SpreadTable::new(num_psy_bins);
        }
        self.margin
            .rebuild(&self.margin_points, sample_rate, self.fft_size)?;
        self.sample_rate = sample_rate;

        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, num_psy_bins, "psyclip: sample rate changed");

        Ok(())
    }

    /// Process one hop.
    ///
    /// `input` and `output` must both hold exactly [`feed_size`](Self::feed_size)
    /// samples, and successive calls must carry contiguous stream chunks.
    /// With `diff_only` the output is the distortion alone, without the
    /// delayed input. When `total_margin_shift` is given it is multiplied by
    /// the mask shift of every round but the last.
    pub fn feed(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        diff_only: bool,
        mut total_margin_shift: Option<&mut f32>,
    ) {
        let hop = self.frames.hop();
        debug_assert_eq!(input.len(), hop);
        debug_assert_eq!(output.len(), hop);

        self.frames.push(input);

        self.window
            .apply(self.frames.input(), &mut self.windowed, WindowMode::Overwrite);
        self.fft.forward(&self.windowed, &mut self.spectrum);
        compute_mask_curve(&self.spectrum, &self.spread, &self.margin, &mut self.mask);

        let orig_peak = self.window.unwindowed_peak(&self.windowed, self.clip_level);
        let mut peak = orig_peak;

        self.clipping_delta.fill(0.0);

        let iterations = self.iterations as usize;
        let boosted_from = iterations - iterations / 3;
        let norm = 1.0 / self.fft_size as f32;

        for round in 0..iterations {
            let delta_boost = if round >= boosted_from && peak < BOOST_PEAK_LIMIT {
                BOOSTED_DELTA
            } else {
                1.0
            };

            clip_to_window(
                &self.windowed,
                &mut self.clipping_delta,
                self.window.coefficients(),
                self.clip_level,
                delta_boost,
            );

            self.fft.forward(&self.clipping_delta, &mut self.spectrum);
            limit_spectrum(&mut self.spectrum, &self.mask);
            self.fft.inverse(&self.spectrum, &mut self.clipping_delta);
            for x in &mut self.clipping_delta {
                *x *= norm;
            }

            peak = clipped_peak(
                &self.windowed,
                &self.clipping_delta,
                self.window.inverse(),
                self.clip_level,
            );

            let mut shift = MASK_SHIFT_STEP;
            if orig_peak > 1.0 && peak > 1.0 {
                let achieved = orig_peak - peak;
                if round + 1 < boosted_from && achieved > 0.0 {
                    // Scale by how much reduction is still missing, but never
                    // past the residual peak itself
                    let needed = orig_peak - 1.0;
                    shift = shift.max((needed / achieved).min(peak));
                } else {
                    shift = shift.max(peak);
                }
            }
            shift = 1.0 + (shift - 1.0) * self.adaptive_strength;

            if round + 1 < iterations {
                if let Some(total) = total_margin_shift.as_deref_mut() {
                    *total *= shift;
                }
            }

            for m in &mut self.mask {
                *m *= shift;
            }
        }

        self.window.apply(
            &self.clipping_delta,
            self.frames.distortion_mut(),
            WindowMode::Accumulate,
        );

        let dry = self.frames.delayed_input();
        let wet = self.frames.completed();
        for ((out, &d), &x) in output.iter_mut().zip(wet).zip(dry) {
            *out = d / SQUARED_HANN_OVERLAP_GAIN;
            if !diff_only {
                *out += x;
            }
        }
    }

    /// Advance one hop without clipping, emitting the delayed input.
    ///
    /// Keeps the stream aligned while bypassed so that switching back does
    /// not jump in time.
    pub fn feed_dry(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), self.frames.hop());
        self.frames.push(input);
        output.copy_from_slice(self.frames.delayed_input());
    }

    /// Clear the sliding frames (silence in, silence out).
    pub fn reset(&mut self) {
        self.frames.clear();
        self.clipping_delta.fill(0.0);
    }

    /// Samples per [`feed`](Self::feed) call (`fft_size / 4`).
    #[inline]
    pub fn feed_size(&self) -> usize {
        self.frames.hop()
    }

    /// Delay between input and output in samples (`fft_size - hop`).
    #[inline]
    pub fn latency_samples(&self) -> usize {
        self.fft_size - self.frames.hop()
    }

    /// Sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// FFT frame size.
    #[inline]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Linear peak ceiling.
    #[inline]
    pub fn clip_level(&self) -> f32 {
        self.clip_level
    }

    /// Clip-and-filter rounds per hop.
    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Adaptive distortion strength in `[0, 1]`.
    #[inline]
    pub fn adaptive_distortion_strength(&self) -> f32 {
        self.adaptive_strength
    }

    /// Bins covered by the psychoacoustic spreading model.
    #[inline]
    pub fn num_psy_bins(&self) -> usize {
        self.spread.num_psy_bins()
    }

    /// Analysis/synthesis window.
    #[inline]
    pub fn window(&self) -> &HannWindow {
        &self.window
    }

    /// Psychoacoustic spread table.
    #[inline]
    pub fn spread_table(&self) -> &SpreadTable {
        &self.spread
    }

    /// Current margin curve.
    #[inline]
    pub fn margin_curve(&self) -> &MarginCurve {
        &self.margin
    }

    /// Control points of the current margin curve.
    #[inline]
    pub fn margin_points(&self) -> &[MarginPoint] {
        &self.margin_points
    }

    /// Time-domain clipping delta of the most recent frame (before synthesis windowing).
    #[inline]
    pub fn clipping_delta(&self) -> &[f32] {
        &self.clipping_delta
    }

    /// Mask curve of the most recent frame, after all shifts.
    #[inline]
    pub fn mask_curve(&self) -> &[f32] {
        &self.mask
    }
}

#[cfg(feature = "std")]
impl PsyClipper<crate::transform::RustRealFft> {
    /// Build a clipper on the rustfft backend.
    pub fn new(sample_rate: u32, fft_size: usize, clip_level: f32) -> Result<Self, ClipperError> {
        if !is_power_of_two(fft_size) {
            return Err(ClipperError::FftSizeNotPowerOfTwo(fft_size));
        }
        let fft = crate::transform::RustRealFft::new(fft_size);
        Self::with_transform(sample_rate, fft_size, clip_level, fft)
    }
}

/// Fold the overshoot of `windowed + delta` beyond `±clip_level · w` into `delta`.
#[inline]
fn clip_to_window(windowed: &[f32], delta: &mut [f32], window: &[f32], clip_level: f32, boost: f32) {
    for ((d, &x), &w) in delta.iter_mut().zip(windowed).zip(window) {
        let limit = clip_level * w;
        let effective = x + *d;
        if effective > limit {
            *d += (limit - effective) * boost;
        } else if effective < -limit {
            *d += (-limit - effective) * boost;
        }
    }
}

/// Unwindowed peak of `windowed + delta` relative to `clip_level`.
#[inline]
fn clipped_peak(windowed: &[f32], delta: &[f32], inv_window: &[f32], clip_level: f32) -> f32 {
    let peak = windowed
        .iter()
        .zip(delta)
        .zip(inv_window)
        .fold(0.0_f32, |acc, ((&x, &d), &inv)| acc.max(((x + d) * inv).abs()));
    peak / clip_level
}
