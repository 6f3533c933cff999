//! Sliding analysis/synthesis frames for 4× overlap-add.
//!
//! The analysis frame (`input`) always holds the most recent `frame_size`
//! input samples. The synthesis frame (`distortion`) accumulates windowed
//! distortion from the last four analysis frames; its first `hop` samples
//! are complete once the frame has been shifted three times past them.
//!
//! ```text
//!          ┌────── frame_size ──────┐
//! input:   [ h0 | h1 | h2 | new hop ]   ← push(): shift left by hop, append
//! distort: [ h0 | h1 | h2 |  zeros  ]   ← completed output = h0
//! ```
//!
//! No bounds or length checks happen on the hot path beyond debug assertions:
//! callers hand over exactly `hop` samples per call.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Paired input/distortion frames shifted by one hop per call.
#[derive(Debug, Clone)]
pub struct OverlapAddBuffer {
    input: Vec<f32>,
    distortion: Vec<f32>,
    hop: usize,
}

impl OverlapAddBuffer {
    /// Create zeroed frames of `frame_size` samples with a hop of `frame_size / 4`.
    pub fn new(frame_size: usize) -> Self {
        Self {
            input: vec![0.0; frame_size],
            distortion: vec![0.0; frame_size],
            hop: frame_size / 4,
        }
    }

    /// Samples consumed and produced per [`push`](Self::push).
    #[inline]
    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Frame length in samples.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.input.len()
    }

    /// Shift both frames left by one hop and append `samples` to the input.
    ///
    /// The newly exposed tail of the distortion frame is zeroed.
    #[inline]
    pub fn push(&mut self, samples: &[f32]) {
        debug_assert_eq!(samples.len(), self.hop);
        let keep = self.input.len() - self.hop;
        self.input.copy_within(self.hop.., 0);
        self.input[keep..].copy_from_slice(samples);
        self.distortion.copy_within(self.hop.., 0);
        self.distortion[keep..].fill(0.0);
    }

    /// Current analysis frame.
    #[inline]
    pub fn input(&self) -> &[f32] {
        &self.input
    }

    /// Oldest hop of the input frame, aligned with [`completed`](Self::completed).
    #[inline]
    pub fn delayed_input(&self) -> &[f32] {
        &self.input[..self.hop]
    }

    /// Mutable synthesis frame for overlap-add accumulation.
    #[inline]
    pub fn distortion_mut(&mut self) -> &mut [f32] {
        &mut self.distortion
    }

    /// Oldest hop of the synthesis frame; all four overlapping frames have been added.
    #[inline]
    pub fn completed(&self) -> &[f32] {
        &self.distortion[..self.hop]
    }

    /// Zero both frames.
    pub fn clear(&mut self) {
        self.input.fill(0.0);
        self.distortion.fill(0.0);
    }
}
