//! Startup configuration for the sampling pipeline.
//!
//! `config.txt` is line-oriented `key = value` text with blank lines and
//! `#` comments ignored, which makes it a TOML subset. Every failure path
//! degrades to the documented defaults with a warning; configuration is
//! never fatal.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::calibration::{CalibrationParams, DEFAULT_HUMIDITY_OFFSET_PCT};

/// Default number of successful cycles averaged into one logged record.
pub const DEFAULT_OVERSAMPLE_COUNT: u32 = 5;

/// Number of successful cycles averaged into one logged record.
///
/// Always at least 1. Created once at startup and immutable for the
/// process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWindow(u32);

impl SampleWindow {
    /// Returns `None` for a count of zero.
    pub fn new(count: u32) -> Option<Self> {
        (count >= 1).then_some(Self(count))
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self(DEFAULT_OVERSAMPLE_COUNT)
    }
}

/// Raw, unvalidated view of the config file. Every key is optional;
/// unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    oversample_count: Option<i64>,
    humidity_offset: Option<f64>,
}

/// Validated startup configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Config {
    pub window: SampleWindow,
    pub calibration: CalibrationParams,
}

impl Config {
    /// Load configuration from `path`, substituting documented defaults
    /// for anything missing or invalid.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!(
                    "config file {} not readable ({e}), using default values",
                    path.display()
                );
                return Self::default();
            }
        };
        Self::from_config_text(&text)
    }

    /// Parse configuration from `key = value` text.
    pub fn from_config_text(text: &str) -> Self {
        let raw: RawConfig = match toml::from_str(text) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("config file is not valid key = value text ({e}), using default values");
                RawConfig::default()
            }
        };
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Self {
        let window = match raw.oversample_count {
            None => SampleWindow::default(),
            Some(n) => match u32::try_from(n).ok().and_then(SampleWindow::new) {
                Some(window) => window,
                None => {
                    log::warn!(
                        "invalid oversample_count {n} in config, using default value of {DEFAULT_OVERSAMPLE_COUNT}"
                    );
                    SampleWindow::default()
                }
            },
        };

        let humidity_offset_pct = match raw.humidity_offset {
            None => DEFAULT_HUMIDITY_OFFSET_PCT,
            Some(v) if v >= 0.0 => v as f32,
            Some(v) => {
                log::warn!(
                    "invalid humidity_offset {v} in config, using default value of {DEFAULT_HUMIDITY_OFFSET_PCT}"
                );
                DEFAULT_HUMIDITY_OFFSET_PCT
            }
        };

        Self {
            window,
            calibration: CalibrationParams::new(humidity_offset_pct),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_config_text("");
        assert_eq!(config.window.get(), DEFAULT_OVERSAMPLE_COUNT);
        assert_eq!(
            config.calibration.humidity_offset_pct,
            DEFAULT_HUMIDITY_OFFSET_PCT
        );
    }

    #[test]
    fn test_valid_values_are_applied() {
        let config = Config::from_config_text("oversample_count = 10\nhumidity_offset = 1.5\n");
        assert_eq!(config.window.get(), 10);
        assert_eq!(config.calibration.humidity_offset_pct, 1.5);
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let text = "# sampling\n\noversample_count = 3\n\n# calibration\nhumidity_offset = 0.0\n";
        let config = Config::from_config_text(text);
        assert_eq!(config.window.get(), 3);
        assert_eq!(config.calibration.humidity_offset_pct, 0.0);
    }

    #[test]
    fn test_zero_oversample_count_falls_back_to_default() {
        let config = Config::from_config_text("oversample_count = 0\n");
        assert_eq!(config.window.get(), DEFAULT_OVERSAMPLE_COUNT);
    }

    #[test]
    fn test_negative_oversample_count_falls_back_to_default() {
        let config = Config::from_config_text("oversample_count = -4\n");
        assert_eq!(config.window.get(), DEFAULT_OVERSAMPLE_COUNT);
    }

    #[test]
    fn test_negative_humidity_offset_falls_back_to_default() {
        let config = Config::from_config_text("humidity_offset = -1.0\n");
        assert_eq!(
            config.calibration.humidity_offset_pct,
            DEFAULT_HUMIDITY_OFFSET_PCT
        );
    }

    #[test]
    fn test_unparsable_file_falls_back_to_defaults() {
        let config = Config::from_config_text("oversample_count equals five");
        assert_eq!(config.window.get(), DEFAULT_OVERSAMPLE_COUNT);
        assert_eq!(
            config.calibration.humidity_offset_pct,
            DEFAULT_HUMIDITY_OFFSET_PCT
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = Config::from_config_text("log_level = 3\noversample_count = 2\n");
        assert_eq!(config.window.get(), 2);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/config.txt"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_sample_window_rejects_zero() {
        assert!(SampleWindow::new(0).is_none());
        assert_eq!(SampleWindow::new(1).map(SampleWindow::get), Some(1));
    }
}
