//! Construction-time errors.
//!
//! Everything that can go wrong is caught when a clipper is built or its
//! tables are rebuilt. The processing path itself has no failure modes.

use thiserror::Error;

/// Errors returned when building or reconfiguring a clipper.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClipperError {
    /// Sample rate must be positive.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// FFT size must be a power of two.
    #[error("fft size {0} is not a power of two")]
    FftSizeNotPowerOfTwo(usize),

    /// FFT size below the supported minimum.
    #[error("fft size {size} is below the minimum of {min}")]
    FftSizeTooSmall {
        /// Requested size.
        size: usize,
        /// Smallest accepted size.
        min: usize,
    },

    /// The supplied transform does not match the requested FFT size.
    #[error("transform size {actual} does not match fft size {expected}")]
    TransformSizeMismatch {
        /// FFT size of the clipper.
        expected: usize,
        /// Size reported by the transform.
        actual: usize,
    },

    /// A margin curve needs at least one control point.
    #[error("margin curve has no control points")]
    EmptyMarginCurve,
}
