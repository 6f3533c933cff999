//! Error types for configuration operations.

use psyclip_core::ClipperError;
use thiserror::Error;

/// Errors that can occur while parsing, validating or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// No factory preset with this name
    #[error("preset not found: {0}")]
    PresetNotFound(String),

    /// Validation errors
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),

    /// The clipper rejected the configuration
    #[error("failed to build clipper: {0}")]
    Clipper(#[from] ClipperError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use std::error::Error;

    #[test]
    fn preset_not_found_display() {
        let err = ConfigError::PresetNotFound("brickwall".to_string());
        assert_eq!(err.to_string(), "preset not found: brickwall");
        assert!(err.source().is_none());
    }

    #[test]
    fn validation_wraps_and_chains() {
        let err: ConfigError = ValidationError::EmptyMarginCurve.into();
        assert_eq!(
            err.to_string(),
            "validation failed: margin curve has no points"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn clipper_error_wraps() {
        let err: ConfigError = ClipperError::FftSizeNotPowerOfTwo(1000).into();
        assert_eq!(
            err.to_string(),
            "failed to build clipper: fft size 1000 is not a power of two"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn toml_parse_wraps() {
        let parse = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let err = ConfigError::from(parse);
        assert!(err.to_string().starts_with("failed to parse TOML"));
    }
}
