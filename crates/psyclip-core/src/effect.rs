//! Sample-stream processor interface.
//!
//! [`PsyClipper`](crate::PsyClipper) works in fixed hops. Hosts usually hand
//! over arbitrary block sizes, one sample or channel pair at a time. The
//! [`Effect`] trait is that host-facing shape; adapters buffer samples into
//! hops behind it.
//!
//! ## Design Decisions
//!
//! - **Mono core, stereo wrapper**: `process` is mono. Stereo defaults to
//!   running the same state over both channels, which is only right for
//!   stateless effects; stateful ones override [`process_stereo`](Effect::process_stereo)
//!   and report [`is_true_stereo`](Effect::is_true_stereo).
//!
//! - **Object-safe**: `dyn Effect` works for runtime chains.
//!
//! - **No allocations**: every method is callable from an audio callback.

/// A real-time audio processor.
///
/// # Example
///
/// ```rust
/// use psyclip_core::Effect;
///
/// struct Trim {
///     gain: f32,
/// }
///
/// impl Effect for Trim {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.gain
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
///
/// let mut trim = Trim { gain: 0.5 };
/// assert_eq!(trim.process(1.0), 0.5);
/// ```
pub trait Effect {
    /// Process a single sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process one stereo sample pair.
    ///
    /// Default runs [`process`](Self::process) on each channel in turn.
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.process(left), self.process(right))
    }

    /// Process a block of samples.
    ///
    /// # Panics
    /// Debug builds panic if `input.len() != output.len()`.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "Input and output buffers must have same length"
        );
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*inp);
        }
    }

    /// Process a block of samples in place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Process a block of stereo samples.
    fn process_block_stereo(
        &mut self,
        left_in: &[f32],
        right_in: &[f32],
        left_out: &mut [f32],
        right_out: &mut [f32],
    ) {
        debug_assert_eq!(left_in.len(), right_in.len());
        debug_assert_eq!(left_in.len(), left_out.len());
        debug_assert_eq!(left_in.len(), right_out.len());
        for i in 0..left_in.len() {
            let (l, r) = self.process_stereo(left_in[i], right_in[i]);
            left_out[i] = l;
            right_out[i] = r;
        }
    }

    /// Update the sample rate in Hz.
    ///
    /// May reallocate internal tables; call off the audio thread.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state without touching parameters.
    fn reset(&mut self);

    /// Processing delay in samples, for host latency compensation.
    fn latency_samples(&self) -> usize {
        0
    }

    /// Whether the two channels are processed by independent state.
    fn is_true_stereo(&self) -> bool {
        false
    }
}
