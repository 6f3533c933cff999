//! Range and consistency checks for [`ClipperConfig`].
//!
//! Every check runs; problems are collected rather than stopping at the
//! first one, so a user editing a preset sees everything that is wrong.
//!
//! # Example
//!
//! ```rust
//! use psyclip_config::{ClipperConfig, ValidationError, validate_config};
//!
//! let mut config = ClipperConfig::default();
//! config.iterations = 0;
//! config.fft_size = 1000;
//! match validate_config(&config) {
//!     Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use thiserror::Error;

use crate::config::ClipperConfig;

/// Sample rate range in Hz.
pub const SAMPLE_RATE_RANGE: (u32, u32) = (8_000, 384_000);

/// FFT size range (powers of two only).
pub const FFT_SIZE_RANGE: (usize, usize) = (32, 65_536);

/// Clip level range in dB.
pub const CLIP_LEVEL_DB_RANGE: (f32, f32) = psyclip_effects::CLIP_LEVEL_DB_RANGE;

/// Input and output level range in dB.
pub const LEVEL_DB_RANGE: (f32, f32) = psyclip_effects::LEVEL_DB_RANGE;

/// Iteration count range.
pub const ITERATIONS_RANGE: (u32, u32) = (1, psyclip_effects::MAX_ITERATIONS);

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// FFT size is not a power of two.
    #[error("fft_size {0} is not a power of two")]
    FftSizeNotPowerOfTwo(usize),

    /// The margin curve is empty.
    #[error("margin curve has no points")]
    EmptyMarginCurve,

    /// Margin curve frequencies decrease.
    #[error("margin curve point {index} at {hz} Hz comes after {previous_hz} Hz")]
    UnorderedMarginCurve {
        /// Index of the offending point.
        index: usize,
        /// Its frequency.
        hz: u32,
        /// Frequency of the point before it.
        previous_hz: u32,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check every field of `config`.
pub fn validate_config(config: &ClipperConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    check_range(
        &mut errors,
        "sample_rate",
        config.sample_rate,
        SAMPLE_RATE_RANGE,
    );

    if config.fft_size.is_power_of_two() {
        check_range(
            &mut errors,
            "fft_size",
            config.fft_size as f64,
            (FFT_SIZE_RANGE.0 as f64, FFT_SIZE_RANGE.1 as f64),
        );
    } else {
        errors.push(ValidationError::FftSizeNotPowerOfTwo(config.fft_size));
    }

    check_range(
        &mut errors,
        "clip_level_db",
        config.clip_level_db,
        CLIP_LEVEL_DB_RANGE,
    );
    check_range(&mut errors, "iterations", config.iterations, ITERATIONS_RANGE);
    check_range(
        &mut errors,
        "adaptive_distortion_strength",
        config.adaptive_distortion_strength,
        (0.0, 1.0),
    );
    check_range(&mut errors, "level_in_db", config.level_in_db, LEVEL_DB_RANGE);
    check_range(&mut errors, "level_out_db", config.level_out_db, LEVEL_DB_RANGE);

    validate_margin_curve(&config.margin_curve).unwrap_or_else(|e| errors.push(e));

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Check that `points` is non-empty with non-decreasing frequencies.
pub fn validate_margin_curve(points: &[(u32, i32)]) -> ValidationResult<()> {
    if points.is_empty() {
        return Err(ValidationError::EmptyMarginCurve);
    }
    for (index, pair) in points.windows(2).enumerate() {
        let (previous_hz, hz) = (pair[0].0, pair[1].0);
        if hz < previous_hz {
            return Err(ValidationError::UnorderedMarginCurve {
                index: index + 1,
                hz,
                previous_hz,
            });
        }
    }
    Ok(())
}

/// Push an `OutOfRange` error unless `min <= value <= max`. NaN is out of range.
fn check_range<T>(
    errors: &mut Vec<ValidationError>,
    param: &str,
    value: T,
    (min, max): (T, T),
) where
    T: PartialOrd + Into<f64> + Copy,
{
    if !(value >= min && value <= max) {
        errors.push(ValidationError::OutOfRange {
            param: param.to_string(),
            value: value.into(),
            min: min.into(),
            max: max.into(),
        });
    }
}
