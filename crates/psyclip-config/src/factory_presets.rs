//! Built-in clipper presets.
//!
//! Embedded at compile time, so they are available without any files on disk.

use crate::config::ClipperConfig;
use crate::error::ConfigError;

/// Short names of the factory presets, in display order.
pub static FACTORY_PRESET_NAMES: &[&str] = &["default", "transparent", "mastering", "loud"];

static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("default", DEFAULT_PRESET),
    ("transparent", TRANSPARENT_PRESET),
    ("mastering", MASTERING_PRESET),
    ("loud", LOUD_PRESET),
];

const DEFAULT_PRESET: &str = r#"
name = "Default"
description = "Unity ceiling with the stock margin curve"
"#;

const TRANSPARENT_PRESET: &str = r#"
name = "Transparent"
description = "Extra headroom everywhere, frozen mask, more rounds"
clip_level_db = 0.0
iterations = 12
adaptive_distortion_strength = 0.0
margin_curve = [
    [0, 18], [125, 18], [250, 20], [500, 22], [1000, 24],
    [2000, 24], [4000, 24], [8000, 20], [16000, 10], [20000, 0],
]
"#;

const MASTERING_PRESET: &str = r#"
name = "Mastering"
description = "Inter-sample safety margin for final masters"
fft_size = 4096
clip_level_db = -0.3
iterations = 10
adaptive_distortion_strength = 0.5
auto_level = true
"#;

const LOUD_PRESET: &str = r#"
name = "Loud"
description = "Drives hard into a relaxed mask"
clip_level_db = -1.0
level_in_db = 6.0
iterations = 6
adaptive_distortion_strength = 1.0
margin_curve = [
    [0, 10], [250, 12], [1000, 14], [4000, 14],
    [8000, 10], [16000, 0], [20000, -12],
]
"#;

/// All factory presets, parsed.
pub fn factory_presets() -> Vec<ClipperConfig> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| ClipperConfig::from_toml(toml).ok())
        .collect()
}

/// Look up a factory preset by short name or display name, ignoring case.
///
/// # Example
///
/// ```rust
/// use psyclip_config::get_factory_preset;
///
/// let preset = get_factory_preset("Mastering").unwrap();
/// assert_eq!(preset.fft_size, 4096);
/// assert!(get_factory_preset("nonexistent").is_none());
/// ```
pub fn get_factory_preset(name: &str) -> Option<ClipperConfig> {
    let name_lower = name.to_lowercase();

    if let Some((_, toml)) = FACTORY_PRESETS_TOML
        .iter()
        .find(|(short, _)| short.to_lowercase() == name_lower)
    {
        return ClipperConfig::from_toml(toml).ok();
    }

    factory_presets().into_iter().find(|preset| {
        preset
            .name
            .as_deref()
            .is_some_and(|n| n.to_lowercase() == name_lower)
    })
}

/// Like [`get_factory_preset`], with an error naming the missing preset.
pub fn load_factory_preset(name: &str) -> Result<ClipperConfig, ConfigError> {
    get_factory_preset(name).ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))
}

/// Short names of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Whether `name` matches a factory preset (case-insensitive).
///
/// ```rust
/// use psyclip_config::is_factory_preset;
///
/// assert!(is_factory_preset("loud"));
/// assert!(is_factory_preset("LOUD"));
/// assert!(!is_factory_preset("quiet"));
/// ```
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_presets_parse() {
        assert_eq!(factory_presets().len(), FACTORY_PRESETS_TOML.len());
    }

    #[test]
    fn all_presets_validate() {
        for preset in factory_presets() {
            assert!(
                preset.validate().is_ok(),
                "preset {:?} failed validation: {:?}",
                preset.name,
                preset.validate()
            );
        }
    }

    #[test]
    fn names_match_table() {
        assert_eq!(factory_preset_names(), FACTORY_PRESET_NAMES);
    }

    #[test]
    fn default_preset_is_default_config() {
        let preset = get_factory_preset("default").unwrap();
        assert_eq!(
            preset.margin_curve,
            ClipperConfig::default().margin_curve
        );
        assert_eq!(preset.clip_level_db, 0.0);
        assert_eq!(preset.name.as_deref(), Some("Default"));
    }

    #[test]
    fn lookup_by_display_name() {
        let preset = get_factory_preset("TRANSPARENT").unwrap();
        assert_eq!(preset.iterations, 12);
        assert_eq!(preset.adaptive_distortion_strength, 0.0);
    }

    #[test]
    fn missing_preset_error() {
        let err = load_factory_preset("brickwall").unwrap_err();
        assert!(matches!(err, ConfigError::PresetNotFound(name) if name == "brickwall"));
    }
}
