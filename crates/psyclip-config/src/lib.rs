//! Psyclip Config - settings, validation and presets
//!
//! Describes a clipper as plain data that can be written to and read from
//! TOML, checked against the supported parameter ranges, and turned into a
//! running [`Clipper`](psyclip_core::Clipper) or
//! [`PsyClip`](psyclip_effects::PsyClip).
//!
//! - [`ClipperConfig`] - every user-facing setting with serde defaults
//! - [`validate_config`] - collects all range problems at once
//! - [`get_factory_preset`] - built-in starting points
//!
//! ## Example
//!
//! ```rust
//! use psyclip_config::ClipperConfig;
//! use psyclip_core::Effect;
//!
//! let config = ClipperConfig::from_toml(r#"
//!     name = "Bus"
//!     clip_level_db = -0.5
//!     iterations = 8
//! "#).unwrap();
//!
//! let mut clip = config.build_effect().unwrap();
//! let (_l, _r) = clip.process_stereo(0.5, 0.5);
//! ```

pub mod config;
pub mod error;
pub mod factory_presets;
pub mod validation;

pub use config::ClipperConfig;
pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset, load_factory_preset,
};
pub use validation::{
    CLIP_LEVEL_DB_RANGE, FFT_SIZE_RANGE, ITERATIONS_RANGE, LEVEL_DB_RANGE, SAMPLE_RATE_RANGE,
    ValidationError, ValidationResult, validate_config, validate_margin_curve,
};
