//! Dashboard settings
//!
//! Settings come from an optional JSON file, validated as it is read, then
//! the `SUNPATH_AIRVISUAL_KEY` environment variable. Command line flags are
//! applied on top by the binary.

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{DEFAULT_RADIUS_M, MAX_RADIUS_M, MIN_RADIUS_M};
use crate::data::{get_cache_dir, DEFAULT_TIMEOUT_S};
use crate::path::DisplayOptions;

pub mod error;
pub use error::ConfigError;

/// Environment variable holding the AirVisual API key
pub const AIRVISUAL_KEY_ENV: &str = "SUNPATH_AIRVISUAL_KEY";

/// Allowed range for the path sampling steps, in minutes
pub const MIN_STEP_MINUTES: u32 = 1;
pub const MAX_STEP_MINUTES: u32 = 60;

pub const DEFAULT_STEP_MINUTES: u32 = 10;
pub const DEFAULT_CHART_STEP_MINUTES: u32 = 15;
pub const DEFAULT_SEASONAL_STEP_MINUTES: u32 = 20;
pub const DEFAULT_ANIMATION_INTERVAL_MS: u64 = 150;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    radius_m: f64,
    step_minutes: u32,
    chart_step_minutes: u32,
    seasonal_step_minutes: u32,
    animation_interval_ms: u64,
    hide_at_or_below: Option<f64>,
    refraction: bool,
    #[serde(skip_serializing)]
    airvisual_key: Option<String>,
    feedback_path: PathBuf,
    http_timeout_s: u64,
}

// Every field is optional in the file; present values are range-checked here
// so a loaded Settings is always usable.
impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct SettingsHelper {
            radius_m: Option<f64>,
            step_minutes: Option<u32>,
            chart_step_minutes: Option<u32>,
            seasonal_step_minutes: Option<u32>,
            animation_interval_ms: Option<u64>,
            #[serde(default = "default_hide_threshold")]
            hide_at_or_below: Option<f64>,
            refraction: Option<bool>,
            airvisual_key: Option<String>,
            feedback_path: Option<PathBuf>,
            http_timeout_s: Option<u64>,
        }

        let helper = SettingsHelper::deserialize(deserializer)?;
        let defaults = Settings::default();

        let settings = Settings {
            radius_m: helper.radius_m.unwrap_or(defaults.radius_m),
            step_minutes: helper.step_minutes.unwrap_or(defaults.step_minutes),
            chart_step_minutes: helper
                .chart_step_minutes
                .unwrap_or(defaults.chart_step_minutes),
            seasonal_step_minutes: helper
                .seasonal_step_minutes
                .unwrap_or(defaults.seasonal_step_minutes),
            animation_interval_ms: helper
                .animation_interval_ms
                .unwrap_or(defaults.animation_interval_ms),
            hide_at_or_below: helper.hide_at_or_below,
            refraction: helper.refraction.unwrap_or(defaults.refraction),
            airvisual_key: helper.airvisual_key.filter(|k| !k.trim().is_empty()),
            feedback_path: helper.feedback_path.unwrap_or(defaults.feedback_path),
            http_timeout_s: helper.http_timeout_s.unwrap_or(defaults.http_timeout_s),
        };

        settings.validate().map_err(D::Error::custom)?;
        Ok(settings)
    }
}

fn default_hide_threshold() -> Option<f64> {
    Some(0.0)
}

fn check_step(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if !(MIN_STEP_MINUTES..=MAX_STEP_MINUTES).contains(&value) {
        return Err(ConfigError::StepMinutes {
            field,
            value,
            min: MIN_STEP_MINUTES,
            max: MAX_STEP_MINUTES,
        });
    }
    Ok(())
}

impl Settings {
    /// Read settings from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let settings: Settings = serde_json::from_reader(reader)?;
        Ok(settings)
    }

    /// Settings from an optional file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        let mut settings = match path {
            Some(p) => Settings::from_file(p)?,
            None => Settings::default(),
        };
        if let Ok(key) = env::var(AIRVISUAL_KEY_ENV) {
            settings = settings.with_airvisual_key(Some(key));
        }
        Ok(settings)
    }

    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_RADIUS_M..=MAX_RADIUS_M).contains(&self.radius_m) {
            return Err(ConfigError::Radius {
                value: self.radius_m,
                min: MIN_RADIUS_M,
                max: MAX_RADIUS_M,
            });
        }
        check_step("step_minutes", self.step_minutes)?;
        check_step("chart_step_minutes", self.chart_step_minutes)?;
        check_step("seasonal_step_minutes", self.seasonal_step_minutes)?;
        if self.animation_interval_ms == 0 {
            return Err(ConfigError::AnimationInterval);
        }
        if self.http_timeout_s == 0 {
            return Err(ConfigError::HttpTimeout);
        }
        Ok(())
    }

    pub fn with_radius(mut self, radius_m: f64) -> Result<Settings, ConfigError> {
        self.radius_m = radius_m;
        self.validate()?;
        Ok(self)
    }

    pub fn with_step_minutes(mut self, minutes: u32) -> Result<Settings, ConfigError> {
        self.step_minutes = minutes;
        self.validate()?;
        Ok(self)
    }

    pub fn with_hide_threshold(mut self, hide_at_or_below: Option<f64>) -> Settings {
        self.hide_at_or_below = hide_at_or_below;
        self
    }

    pub fn with_refraction(mut self, refraction: bool) -> Settings {
        self.refraction = refraction;
        self
    }

    pub fn with_airvisual_key(mut self, key: Option<String>) -> Settings {
        self.airvisual_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_feedback_path<P: AsRef<Path>>(mut self, path: P) -> Settings {
        self.feedback_path = path.as_ref().to_path_buf();
        self
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    pub fn step_minutes(&self) -> u32 {
        self.step_minutes
    }

    pub fn chart_step_minutes(&self) -> u32 {
        self.chart_step_minutes
    }

    pub fn seasonal_step_minutes(&self) -> u32 {
        self.seasonal_step_minutes
    }

    pub fn animation_interval(&self) -> Duration {
        Duration::from_millis(self.animation_interval_ms)
    }

    pub fn refraction(&self) -> bool {
        self.refraction
    }

    pub fn airvisual_key(&self) -> Option<&str> {
        self.airvisual_key.as_deref()
    }

    pub fn feedback_path(&self) -> &Path {
        &self.feedback_path
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_s)
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions::new(self.hide_at_or_below)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_RADIUS_M,
            step_minutes: DEFAULT_STEP_MINUTES,
            chart_step_minutes: DEFAULT_CHART_STEP_MINUTES,
            seasonal_step_minutes: DEFAULT_SEASONAL_STEP_MINUTES,
            animation_interval_ms: DEFAULT_ANIMATION_INTERVAL_MS,
            hide_at_or_below: default_hide_threshold(),
            refraction: true,
            airvisual_key: None,
            feedback_path: get_cache_dir().join("feedback.json"),
            http_timeout_s: DEFAULT_TIMEOUT_S,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(json: &str) -> Result<Settings, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = parse("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.radius_m(), 250.0);
        assert_eq!(settings.step_minutes(), 10);
        assert_eq!(settings.animation_interval(), Duration::from_millis(150));
        assert_eq!(settings.display_options(), DisplayOptions::default());
    }

    #[test]
    fn test_null_threshold_never_hides() {
        let settings = parse(r#"{"hide_at_or_below": null}"#).unwrap();
        assert!(settings.display_options().sun_visible(-20.0));

        let settings = parse(r#"{"hide_at_or_below": -0.833}"#).unwrap();
        assert!(settings.display_options().sun_visible(-0.5));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        assert!(parse(r#"{"radius_m": 20}"#).is_err());
        assert!(parse(r#"{"radius_m": 600}"#).is_err());
        assert!(parse(r#"{"step_minutes": 0}"#).is_err());
        assert!(parse(r#"{"chart_step_minutes": 90}"#).is_err());
        assert!(parse(r#"{"animation_interval_ms": 0}"#).is_err());
        assert!(parse(r#"{"radius": 100}"#).is_err());
    }

    #[test]
    fn test_builder_validation() {
        assert!(Settings::default().with_radius(50.0).is_ok());
        assert!(Settings::default().with_radius(49.9).is_err());
        assert!(Settings::default().with_step_minutes(61).is_err());
        let keyless = Settings::default().with_airvisual_key(Some(" ".to_string()));
        assert!(keyless.airvisual_key().is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"radius_m": 400, "step_minutes": 5, "feedback_path": "/tmp/fb.json"}}"#
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.radius_m(), 400.0);
        assert_eq!(settings.step_minutes(), 5);
        assert_eq!(settings.feedback_path(), Path::new("/tmp/fb.json"));

        assert!(matches!(
            Settings::from_file("/nonexistent/sunpath.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
