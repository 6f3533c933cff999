//! Clipper settings and their TOML format.

use psyclip_core::{
    Clipper, DEFAULT_MARGIN_CURVE, MarginPoint, RealFft, RustRealFft, db_to_linear,
};
use psyclip_effects::PsyClip;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{ValidationResult, validate_config};

/// Every user-facing setting of a clipper, in one serializable struct.
///
/// Missing fields take their defaults, so a file only has to name what it
/// changes.
///
/// # TOML Format
///
/// ```toml
/// name = "Mastering"
/// description = "Gentle ceiling for program material"
/// sample_rate = 48000
/// fft_size = 2048
/// clip_level_db = -0.3
/// iterations = 10
/// adaptive_distortion_strength = 1.0
/// level_in_db = 2.0
/// level_out_db = 0.0
/// auto_level = false
/// margin_curve = [[0, 14], [1000, 20], [20000, -10]]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipperConfig {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate in Hz (defaults to 48000).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Frame length; a power of two.
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,

    /// Ceiling in dBFS.
    #[serde(default)]
    pub clip_level_db: f32,

    /// Refinement rounds per frame.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// How far the mask may be raised on hard frames, 0 to 1.
    #[serde(default = "default_strength")]
    pub adaptive_distortion_strength: f32,

    /// Gain before the clipper in dB.
    #[serde(default)]
    pub level_in_db: f32,

    /// Gain after the clipper in dB.
    #[serde(default)]
    pub level_out_db: f32,

    /// Divide the output by the ceiling.
    #[serde(default)]
    pub auto_level: bool,

    /// Headroom control points as `[hz, db]` pairs, ordered by frequency.
    #[serde(default = "default_margin_curve")]
    pub margin_curve: Vec<(u32, i32)>,
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_fft_size() -> usize {
    2048
}

fn default_iterations() -> u32 {
    psyclip_core::DEFAULT_ITERATIONS
}

fn default_strength() -> f32 {
    psyclip_core::DEFAULT_ADAPTIVE_STRENGTH
}

fn default_margin_curve() -> Vec<(u32, i32)> {
    DEFAULT_MARGIN_CURVE.iter().map(|p| (p.hz, p.db)).collect()
}

impl Default for ClipperConfig {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            sample_rate: default_sample_rate(),
            fft_size: default_fft_size(),
            clip_level_db: 0.0,
            iterations: default_iterations(),
            adaptive_distortion_strength: default_strength(),
            level_in_db: 0.0,
            level_out_db: 0.0,
            auto_level: false,
            margin_curve: default_margin_curve(),
        }
    }
}

impl ClipperConfig {
    /// Create a default configuration with a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the FFT size.
    pub fn with_fft_size(mut self, fft_size: usize) -> Self {
        self.fft_size = fft_size;
        self
    }

    /// Set the ceiling in dB.
    pub fn with_clip_level_db(mut self, db: f32) -> Self {
        self.clip_level_db = db;
        self
    }

    /// Set the iteration count.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Replace the margin curve.
    pub fn with_margin_curve(mut self, points: impl IntoIterator<Item = (u32, i32)>) -> Self {
        self.margin_curve = points.into_iter().collect();
        self
    }

    /// Parse a configuration from TOML.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        tracing::trace!(name = ?config.name, "parsed clipper config");
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_config(self)
    }

    /// The margin curve as clipper control points.
    pub fn margin_points(&self) -> Vec<MarginPoint> {
        self.margin_curve
            .iter()
            .copied()
            .map(MarginPoint::from)
            .collect()
    }

    /// Build a single-channel engine from this configuration.
    ///
    /// Input/output levels and auto level belong to the effect wrapper and
    /// are ignored here.
    pub fn build_clipper(&self) -> Result<Clipper, ConfigError> {
        self.validate()?;
        let mut clipper = Clipper::new(
            self.sample_rate,
            self.fft_size,
            db_to_linear(self.clip_level_db),
        )?;
        clipper.set_iterations(self.iterations);
        clipper.set_adaptive_distortion_strength(self.adaptive_distortion_strength);
        clipper.set_margin_curve(&self.margin_points())?;
        tracing::debug!(
            name = self.name.as_deref().unwrap_or("unnamed"),
            fft_size = self.fft_size,
            sample_rate = self.sample_rate,
            "built clipper"
        );
        Ok(clipper)
    }

    /// Build the stereo effect from this configuration.
    pub fn build_effect(&self) -> Result<PsyClip<RustRealFft>, ConfigError> {
        self.validate()?;
        let mut effect = PsyClip::new(self.sample_rate as f32, self.fft_size)?;
        self.apply_to(&mut effect)?;
        tracing::debug!(
            name = self.name.as_deref().unwrap_or("unnamed"),
            fft_size = self.fft_size,
            sample_rate = self.sample_rate,
            "built effect"
        );
        Ok(effect)
    }

    /// Push the runtime parameters onto an existing effect.
    ///
    /// Sample rate and FFT size are structural and left untouched.
    pub fn apply_to<F: RealFft>(&self, effect: &mut PsyClip<F>) -> Result<(), ConfigError> {
        self.validate()?;
        if effect.fft_size() != self.fft_size {
            tracing::warn!(
                configured = self.fft_size,
                actual = effect.fft_size(),
                "fft size differs from the running effect; keeping the effect's size"
            );
        }
        effect.set_clip_level_db(self.clip_level_db);
        effect.set_iterations(self.iterations);
        effect.set_adaptive_distortion_strength(self.adaptive_distortion_strength);
        effect.set_level_in_db(self.level_in_db);
        effect.set_level_out_db(self.level_out_db);
        effect.set_auto_level(self.auto_level);
        effect.set_margin_curve(&self.margin_points())?;
        Ok(())
    }

    /// Capture the runtime parameters of a running effect.
    pub fn from_effect<F: RealFft>(effect: &PsyClip<F>, sample_rate: u32) -> Self {
        Self {
            name: None,
            description: None,
            sample_rate,
            fft_size: effect.fft_size(),
            clip_level_db: effect.clip_level_db(),
            iterations: effect.iterations(),
            adaptive_distortion_strength: effect.adaptive_distortion_strength(),
            level_in_db: effect.level_in_db(),
            level_out_db: effect.level_out_db(),
            auto_level: effect.auto_level(),
            margin_curve: effect.margin_points().iter().map(|p| (p.hz, p.db)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ClipperConfig::from_toml("").unwrap();
        assert_eq!(config, ClipperConfig::default());
        assert_eq!(config.margin_curve.len(), DEFAULT_MARGIN_CURVE.len());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = ClipperConfig::from_toml(
            r#"
            name = "Hot"
            clip_level_db = -1.5
            margin_curve = [[0, 10], [10000, 0]]
            "#,
        )
        .unwrap();
        assert_eq!(config.name.as_deref(), Some("Hot"));
        assert_eq!(config.clip_level_db, -1.5);
        assert_eq!(config.iterations, psyclip_core::DEFAULT_ITERATIONS);
        assert_eq!(config.margin_curve, vec![(0, 10), (10000, 0)]);
    }

    #[test]
    fn toml_roundtrip() {
        let config = ClipperConfig::new("Round")
            .with_description("trip")
            .with_fft_size(4096)
            .with_iterations(9);
        let toml_str = config.to_toml().unwrap();
        assert_eq!(ClipperConfig::from_toml(&toml_str).unwrap(), config);
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let result = ClipperConfig::from_toml("fft_size = \"big\"");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn build_clipper_applies_settings() {
        let config = ClipperConfig::default()
            .with_fft_size(1024)
            .with_clip_level_db(-6.0)
            .with_iterations(3)
            .with_margin_curve([(0, 12)]);
        let clipper = config.build_clipper().unwrap();
        assert_eq!(clipper.fft_size(), 1024);
        assert_eq!(clipper.iterations(), 3);
        assert!((clipper.clip_level() - db_to_linear(-6.0)).abs() < 1e-6);
        assert_eq!(clipper.margin_points(), &[MarginPoint::new(0, 12)]);
    }

    #[test]
    fn build_rejects_invalid_config() {
        let config = ClipperConfig::default().with_fft_size(1000);
        assert!(matches!(
            config.build_clipper(),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            config.build_effect(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn effect_roundtrip_through_config() {
        let mut config = ClipperConfig::default().with_clip_level_db(-2.0);
        config.level_in_db = 3.0;
        config.auto_level = true;
        let effect = config.build_effect().unwrap();
        let captured = ClipperConfig::from_effect(&effect, config.sample_rate);
        assert!((captured.clip_level_db + 2.0).abs() < 1e-4);
        assert!((captured.level_in_db - 3.0).abs() < 1e-4);
        assert!(captured.auto_level);
        assert_eq!(captured.margin_curve, config.margin_curve);
    }
}
