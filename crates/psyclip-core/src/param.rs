//! Smoothed gain parameters.
//!
//! Input and output levels change while audio runs. Jumping straight to a
//! new gain is audible as a click, so [`SmoothedParam`] glides towards its
//! target with a one-pole lowpass, one step per sample.
//!
//! ```rust
//! use psyclip_core::SmoothedParam;
//!
//! let mut level = SmoothedParam::with_config(1.0, 48_000.0, 10.0);
//! level.set_target(0.5);
//! for _ in 0..4800 {
//!     let _gain = level.advance();
//! }
//! assert!((level.get() - 0.5).abs() < 1e-3);
//! ```

use libm::expf;

/// Default smoothing time for level controls.
pub const DEFAULT_SMOOTHING_MS: f32 = 10.0;

/// A value that approaches its target exponentially.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    /// 1.0 = instant, towards 0 = slower
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Create an unsmoothed parameter at `initial`.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 44_100.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Create a parameter with the given sample rate and smoothing time.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// Create a level parameter with [`DEFAULT_SMOOTHING_MS`].
    pub fn standard(initial: f32, sample_rate: f32) -> Self {
        Self::with_config(initial, sample_rate, DEFAULT_SMOOTHING_MS)
    }

    /// Set the value to glide towards.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump to `value` with no glide.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Update the sample rate, keeping the smoothing time in milliseconds.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Set the smoothing time constant in milliseconds (0 = instant).
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.recalculate_coeff();
    }

    /// Step one sample towards the target and return the new value.
    ///
    /// Once a step is too small to change `current` in f32, the value snaps
    /// onto the target instead of stalling short of it.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let next = self.current + self.coeff * (self.target - self.current);
        self.current = if next == self.current {
            self.target
        } else {
            next
        };
        self.current
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the glide has finished.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-6
    }

    /// Finish the glide immediately.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    // coeff = 1 - exp(-1 / (tau * fs)), tau in seconds
    fn recalculate_coeff(&mut self) {
        if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples = self.smoothing_time_ms / 1000.0 * self.sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples);
        }
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(1.0)
    }
}
