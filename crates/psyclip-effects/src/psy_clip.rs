//! Stereo psychoacoustic clipper as a per-sample [`Effect`].
//!
//! [`PsyClip`] wraps one [`PsyClipper`] per channel and hides their hop-sized
//! framing behind the sample-at-a-time [`Effect`] interface. Incoming samples
//! collect in a hop buffer; when it fills, both clippers run and their output
//! hop is played back while the next one collects.
//!
//! # Signal Flow
//!
//! ```text
//! in ──► × level_in ──► hop buffer ──► PsyClipper (L/R) ──► hop buffer ──► × level_out ──► out
//!                                                                          (÷ clip level
//!                                                                           with auto level)
//! ```
//!
//! # Latency
//!
//! The hop buffering adds one hop on top of the clipper's `fft_size - hop`, so
//! [`latency_samples`](Effect::latency_samples) reports exactly `fft_size`.
//!
//! # Bypass
//!
//! While bypassed the clippers keep sliding their frames through
//! [`PsyClipper::feed_dry`], so the dry signal arrives with the same delay and
//! toggling bypass never jumps in time. Level controls do not apply while
//! bypassed.
//!
//! # Parameters
//!
//! | Parameter | Range | Default | Description |
//! |-----------|-------|---------|-------------|
//! | Clip level | -24–+6 dB | 0.0 | Peak ceiling |
//! | Iterations | 1–32 | 6 | Clip-and-filter rounds per hop |
//! | Adaptive | 0–1 | 1.0 | Adaptive distortion strength |
//! | Level in | -24–+24 dB | 0.0 | Gain before clipping |
//! | Level out | -24–+24 dB | 0.0 | Gain after clipping |
//! | Auto level | on/off | off | Map the ceiling back to full scale |
//! | Diff only | on/off | off | Output only the removed distortion |

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use psyclip_core::{
    ClipperError, Effect, MarginPoint, PsyClipper, RealFft, SmoothedParam, db_to_linear,
    linear_to_db,
};

/// Clip level range in dB.
pub const CLIP_LEVEL_DB_RANGE: (f32, f32) = (-24.0, 6.0);

/// Input and output level range in dB.
pub const LEVEL_DB_RANGE: (f32, f32) = (-24.0, 24.0);

/// Upper bound for clip-and-filter rounds.
pub const MAX_ITERATIONS: u32 = 32;

/// Stereo psychoacoustic clipper.
///
/// # Example
///
/// ```rust
/// use psyclip_core::Effect;
/// use psyclip_effects::PsyClip;
///
/// let mut clip = PsyClip::new(48_000.0, 2048).unwrap();
/// clip.set_clip_level_db(-1.0);
/// clip.set_level_in_db(6.0);
///
/// for _ in 0..4096 {
///     let (_l, _r) = clip.process_stereo(0.8, -0.8);
/// }
/// assert_eq!(clip.latency_samples(), 2048);
/// ```
#[derive(Debug, Clone)]
pub struct PsyClip<F: RealFft> {
    clippers: [PsyClipper<F>; 2],
    hop: usize,
    /// Position within the current hop.
    pos: usize,
    input: [Vec<f32>; 2],
    output: [Vec<f32>; 2],

    clip_level_db: f32,
    level_in: SmoothedParam,
    level_out: SmoothedParam,
    auto_level: bool,
    bypassed: bool,
    diff_only: bool,

    /// Total mask shift of the last hop, worst channel.
    margin_shift: f32,
}

#[cfg(feature = "std")]
impl PsyClip<psyclip_core::RustRealFft> {
    /// Create a clipper on the rustfft backend.
    pub fn new(sample_rate: f32, fft_size: usize) -> Result<Self, ClipperError> {
        let rate = sample_rate_hz(sample_rate);
        let left = PsyClipper::new(rate, fft_size, 1.0)?;
        let right = left.clone();
        Ok(Self::from_clippers(left, right, sample_rate))
    }

    /// Create a clipper with the FFT size recommended for `sample_rate`.
    pub fn with_default_size(sample_rate: f32) -> Result<Self, ClipperError> {
        Self::new(
            sample_rate,
            psyclip_core::recommended_fft_size(sample_rate_hz(sample_rate)),
        )
    }
}

impl<F: RealFft> PsyClip<F> {
    /// Build from two transforms, one per channel.
    pub fn with_transforms(
        sample_rate: f32,
        fft_size: usize,
        left: F,
        right: F,
    ) -> Result<Self, ClipperError> {
        let rate = sample_rate_hz(sample_rate);
        let left = PsyClipper::with_transform(rate, fft_size, 1.0, left)?;
        let right = PsyClipper::with_transform(rate, fft_size, 1.0, right)?;
        Ok(Self::from_clippers(left, right, sample_rate))
    }

    fn from_clippers(left: PsyClipper<F>, right: PsyClipper<F>, sample_rate: f32) -> Self {
        let hop = left.feed_size();
        Self {
            clippers: [left, right],
            hop,
            pos: 0,
            input: [vec![0.0; hop], vec![0.0; hop]],
            output: [vec![0.0; hop], vec![0.0; hop]],
            clip_level_db: 0.0,
            level_in: SmoothedParam::standard(1.0, sample_rate),
            level_out: SmoothedParam::standard(1.0, sample_rate),
            auto_level: false,
            bypassed: false,
            diff_only: false,
            margin_shift: 1.0,
        }
    }

    /// Set the peak ceiling in dB (clamped to -24..+6).
    pub fn set_clip_level_db(&mut self, db: f32) {
        self.clip_level_db = db.clamp(CLIP_LEVEL_DB_RANGE.0, CLIP_LEVEL_DB_RANGE.1);
        let linear = db_to_linear(self.clip_level_db);
        for clipper in &mut self.clippers {
            clipper.set_clip_level(linear);
        }
    }

    /// Peak ceiling in dB.
    pub fn clip_level_db(&self) -> f32 {
        self.clip_level_db
    }

    /// Set clip-and-filter rounds per hop (clamped to 1..=32).
    pub fn set_iterations(&mut self, iterations: u32) {
        let iterations = iterations.clamp(1, MAX_ITERATIONS);
        for clipper in &mut self.clippers {
            clipper.set_iterations(iterations);
        }
    }

    /// Clip-and-filter rounds per hop.
    pub fn iterations(&self) -> u32 {
        self.clippers[0].iterations()
    }

    /// Set the adaptive distortion strength (clamped to 0..1).
    pub fn set_adaptive_distortion_strength(&mut self, strength: f32) {
        for clipper in &mut self.clippers {
            clipper.set_adaptive_distortion_strength(strength);
        }
    }

    /// Adaptive distortion strength.
    pub fn adaptive_distortion_strength(&self) -> f32 {
        self.clippers[0].adaptive_distortion_strength()
    }

    /// Replace the margin curve on both channels.
    pub fn set_margin_curve(&mut self, points: &[MarginPoint]) -> Result<(), ClipperError> {
        for clipper in &mut self.clippers {
            clipper.set_margin_curve(points)?;
        }
        Ok(())
    }

    /// Control points of the active margin curve.
    pub fn margin_points(&self) -> &[MarginPoint] {
        self.clippers[0].margin_points()
    }

    /// Set the input gain in dB (clamped to ±24).
    pub fn set_level_in_db(&mut self, db: f32) {
        self.level_in
            .set_target(db_to_linear(db.clamp(LEVEL_DB_RANGE.0, LEVEL_DB_RANGE.1)));
    }

    /// Target input gain in dB.
    pub fn level_in_db(&self) -> f32 {
        linear_to_db(self.level_in.target())
    }

    /// Set the output gain in dB (clamped to ±24).
    pub fn set_level_out_db(&mut self, db: f32) {
        self.level_out
            .set_target(db_to_linear(db.clamp(LEVEL_DB_RANGE.0, LEVEL_DB_RANGE.1)));
    }

    /// Target output gain in dB.
    pub fn level_out_db(&self) -> f32 {
        linear_to_db(self.level_out.target())
    }

    /// Glide time of the input and output level controls (0 = instant).
    pub fn set_level_smoothing_ms(&mut self, time_ms: f32) {
        self.level_in.set_smoothing_time_ms(time_ms);
        self.level_out.set_smoothing_time_ms(time_ms);
    }

    /// Divide the output by the clip level so the ceiling lands at 0 dBFS.
    pub fn set_auto_level(&mut self, enabled: bool) {
        self.auto_level = enabled;
    }

    /// Whether auto level is on.
    pub fn auto_level(&self) -> bool {
        self.auto_level
    }

    /// Pass the delayed dry signal instead of clipping.
    pub fn set_bypassed(&mut self, bypassed: bool) {
        self.bypassed = bypassed;
    }

    /// Whether the clipper is bypassed.
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Output only the distortion that clipping adds.
    pub fn set_diff_only(&mut self, diff_only: bool) {
        self.diff_only = diff_only;
    }

    /// Whether only the distortion is output.
    pub fn diff_only(&self) -> bool {
        self.diff_only
    }

    /// How far the masks had to widen in the last hop, in dB, worst channel.
    ///
    /// Reads 0 dB until the first hop completes and while bypassed.
    pub fn margin_shift_db(&self) -> f32 {
        linear_to_db(self.margin_shift)
    }

    /// FFT frame size of the underlying clippers.
    pub fn fft_size(&self) -> usize {
        self.clippers[0].fft_size()
    }

    /// Clipper of channel `0` (left) or `1` (right).
    pub fn clipper(&self, channel: usize) -> &PsyClipper<F> {
        &self.clippers[channel]
    }

    /// Run both clippers over the collected hop.
    fn run_hop(&mut self) {
        let mut worst = 1.0_f32;
        for ((clipper, input), output) in self
            .clippers
            .iter_mut()
            .zip(&self.input)
            .zip(&mut self.output)
        {
            if self.bypassed {
                clipper.feed_dry(input, output);
            } else {
                let mut shift = 1.0_f32;
                clipper.feed(input, output, self.diff_only, Some(&mut shift));
                worst = worst.max(shift);
            }
        }
        self.margin_shift = worst;
    }

    #[inline]
    fn process_stereo_inner(&mut self, left: f32, right: f32) -> (f32, f32) {
        let pos = self.pos;

        let (out_l, out_r) = if self.bypassed {
            self.input[0][pos] = left;
            self.input[1][pos] = right;
            (self.output[0][pos], self.output[1][pos])
        } else {
            let gain_in = self.level_in.advance();
            self.input[0][pos] = left * gain_in;
            self.input[1][pos] = right * gain_in;

            let mut gain_out = self.level_out.advance();
            if self.auto_level {
                gain_out /= self.clippers[0].clip_level();
            }
            (self.output[0][pos] * gain_out, self.output[1][pos] * gain_out)
        };

        self.pos += 1;
        if self.pos == self.hop {
            self.pos = 0;
            self.run_hop();
        }
        (out_l, out_r)
    }
}

impl<F: RealFft> Effect for PsyClip<F> {
    /// Mono input runs through both channels; the left output is returned.
    fn process(&mut self, input: f32) -> f32 {
        self.process_stereo_inner(input, input).0
    }

    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.process_stereo_inner(left, right)
    }

    fn is_true_stereo(&self) -> bool {
        true
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        let rate = sample_rate_hz(sample_rate);
        for clipper in &mut self.clippers {
            if let Err(_err) = clipper.set_sample_rate(rate) {
                #[cfg(feature = "tracing")]
                tracing::warn!("psyclip: sample rate {sample_rate} rejected: {_err}");
                return;
            }
        }
        self.level_in.set_sample_rate(sample_rate);
        self.level_out.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        for clipper in &mut self.clippers {
            clipper.reset();
        }
        for buf in self.input.iter_mut().chain(self.output.iter_mut()) {
            buf.fill(0.0);
        }
        self.pos = 0;
        self.level_in.snap_to_target();
        self.level_out.snap_to_target();
        self.margin_shift = 1.0;
    }

    /// One hop of buffering plus the clipper's `fft_size - hop`.
    fn latency_samples(&self) -> usize {
        self.clippers[0].latency_samples() + self.hop
    }
}

/// Host sample rate as whole Hz; non-positive rates map to 0 and are rejected downstream.
#[inline]
fn sample_rate_hz(sample_rate: f32) -> u32 {
    if sample_rate > 0.0 {
        (sample_rate + 0.5) as u32
    } else {
        0
    }
}
