//! Tool configuration.
//!
//! Handles loading and validating `crop.toml`. All options are optional —
//! a missing file or a sparse file falls back to defaults, and unknown keys
//! are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! viewport = 400            # Output side length in pixels (square)
//! background = "#ffffff"    # Canvas fill behind transparent sources
//!
//! [encoder]
//! max_bytes = 1048576       # Byte budget for the encoded cover (1 MiB)
//! quality_start = 0.9       # First JPEG quality attempted
//! quality_floor = 0.1       # Hard floor - never encodes below this
//! quality_step = 0.1        # Step between attempts
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```

use crate::encode::QualityLadder;
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Crop tool configuration loaded from `crop.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    /// Side length of the square output canvas, in pixels.
    pub viewport: u32,
    /// Hex colour (`#rrggbb`) filled behind sources with alpha.
    pub background: String,
    /// JPEG budget/quality settings.
    pub encoder: EncoderConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            viewport: 400,
            background: "#ffffff".to_string(),
            encoder: EncoderConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

/// JPEG encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    /// Byte budget for the encoded cover.
    pub max_bytes: usize,
    pub quality_start: f32,
    pub quality_floor: f32,
    pub quality_step: f32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        let ladder = QualityLadder::default();
        Self {
            max_bytes: 1024 * 1024,
            quality_start: ladder.start,
            quality_floor: ladder.floor,
            quality_step: ladder.step,
        }
    }
}

impl EncoderConfig {
    pub fn ladder(&self) -> QualityLadder {
        QualityLadder {
            start: self.quality_start,
            floor: self.quality_floor,
            step: self.quality_step,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel crop workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

impl CropConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: CropConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file, falling back to defaults when the file
    /// does not exist. Parse and validation errors still surface.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport == 0 {
            return Err(ConfigError::Validation("viewport must be positive".into()));
        }
        let e = &self.encoder;
        if e.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "encoder.max_bytes must be positive".into(),
            ));
        }
        if !(e.quality_start > 0.0 && e.quality_start <= 1.0) {
            return Err(ConfigError::Validation(
                "encoder.quality_start must be in (0, 1]".into(),
            ));
        }
        if !(e.quality_floor > 0.0 && e.quality_floor <= e.quality_start) {
            return Err(ConfigError::Validation(
                "encoder.quality_floor must be in (0, quality_start]".into(),
            ));
        }
        if e.quality_step <= 0.0 {
            return Err(ConfigError::Validation(
                "encoder.quality_step must be positive".into(),
            ));
        }
        // Each ladder level costs a full JPEG encode; a microscopic step
        // must not turn the bounded budget loop into thousands of attempts.
        let steps = ((e.quality_start - e.quality_floor) / e.quality_step).round();
        if !steps.is_finite() || steps >= QualityLadder::MAX_LEVELS as f32 {
            return Err(ConfigError::Validation(format!(
                "encoder quality ladder would exceed {} levels; increase quality_step",
                QualityLadder::MAX_LEVELS
            )));
        }
        self.background_rgb()?;
        Ok(())
    }

    /// Parse the configured background colour.
    pub fn background_rgb(&self) -> Result<Rgb<u8>, ConfigError> {
        parse_hex_rgb(&self.background).ok_or_else(|| {
            ConfigError::Validation(format!(
                "background must be a #rrggbb colour, got '{}'",
                self.background
            ))
        })
    }
}

fn parse_hex_rgb(s: &str) -> Option<Rgb<u8>> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb([r, g, b]))
}

/// A documented stock `crop.toml` for `gen-config`.
pub fn stock_config_toml() -> String {
    let defaults = CropConfig::default();
    format!(
        r##"# covercrop configuration
# All options are optional - the values below are the defaults.

# Side length of the square output canvas, in pixels.
viewport = {viewport}

# Canvas fill behind transparent sources, as a #rrggbb hex colour.
background = "{background}"

[encoder]
# Byte budget for the encoded cover. Quality steps down until the result
# fits; if even the floor is too large, the smallest attempt is kept.
max_bytes = {max_bytes}
quality_start = {start}
quality_floor = {floor}
quality_step = {step}

[processing]
# Max parallel workers for batch mode. Omit for auto (= CPU cores).
# max_processes = 4
"##,
        viewport = defaults.viewport,
        background = defaults.background,
        max_bytes = defaults.encoder.max_bytes,
        start = defaults.encoder.quality_start,
        floor = defaults.encoder.quality_floor,
        step = defaults.encoder.quality_step,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CropConfig::default().validate().is_ok());
    }

    #[test]
    fn stock_config_round_trips() {
        let config: CropConfig = toml::from_str(&stock_config_toml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.viewport, 400);
        assert_eq!(config.encoder.max_bytes, 1024 * 1024);
    }

    #[test]
    fn sparse_config_keeps_defaults() {
        let config: CropConfig = toml::from_str("viewport = 512").unwrap();
        assert_eq!(config.viewport, 512);
        assert_eq!(config.background, "#ffffff");
        assert_eq!(config.encoder.max_bytes, 1024 * 1024);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<CropConfig, _> = toml::from_str("viewprt = 400");
        assert!(result.is_err());
    }

    #[test]
    fn zero_viewport_fails_validation() {
        let config = CropConfig {
            viewport: 0,
            ..CropConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn quality_floor_above_start_fails_validation() {
        let mut config = CropConfig::default();
        config.encoder.quality_floor = 0.95;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_step_fails_validation() {
        let mut config = CropConfig::default();
        config.encoder.quality_step = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn microscopic_step_fails_validation() {
        let mut config = CropConfig::default();
        config.encoder.quality_step = 1e-6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn valid_configs_yield_bounded_ladders() {
        // The widest ladder validation accepts stays under the encode cap
        let mut config = CropConfig::default();
        config.encoder.quality_step = 0.01;
        config.validate().unwrap();
        let levels = config.encoder.ladder().levels();
        assert!(levels.len() <= QualityLadder::MAX_LEVELS);
        assert_eq!(levels.len(), 81);
    }

    #[test]
    fn background_parses_hex() {
        let mut config = CropConfig::default();
        config.background = "#102030".to_string();
        assert_eq!(config.background_rgb().unwrap(), Rgb([0x10, 0x20, 0x30]));
    }

    #[test]
    fn bad_background_fails_validation() {
        for bad in ["white", "#fff", "#gggggg", "ffffff"] {
            let mut config = CropConfig::default();
            config.background = bad.to_string();
            assert!(config.validate().is_err(), "accepted '{bad}'");
        }
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let config = CropConfig::load_or_default(Path::new("/nonexistent/crop.toml")).unwrap();
        assert_eq!(config.viewport, 400);
    }

    #[test]
    fn load_surfaces_parse_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("crop.toml");
        std::fs::write(&path, "viewport = \"wide\"").unwrap();
        assert!(matches!(CropConfig::load(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let auto = effective_threads(&ProcessingConfig::default());
        assert!(auto >= 1);
        let capped = effective_threads(&ProcessingConfig {
            max_processes: Some(1),
        });
        assert_eq!(capped, 1);
        let over = effective_threads(&ProcessingConfig {
            max_processes: Some(usize::MAX),
        });
        assert!(over <= auto);
    }
}
