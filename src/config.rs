//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{APP_NAME, CONFIG_DIR_ENV, DEFAULT_DEBOUNCE_MS};
use crate::models::{RequirementProfile, Sampling};
use crate::services::catalog_client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::services::{PlotColors, SessionOptions};

/// Accepted debounce window in milliseconds.
const DEBOUNCE_RANGE_MS: std::ops::RangeInclusive<u64> = 1..=5000;

/// Catalog service connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Service root, e.g. `http://localhost:5000/api/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Sampling mode preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SamplingSetting {
    /// Let the matcher decide
    None,
    /// Sample along the horizontal axis
    #[default]
    Horizontal,
    /// Sample along the vertical axis
    Vertical,
}

impl From<SamplingSetting> for Option<Sampling> {
    fn from(setting: SamplingSetting) -> Self {
        match setting {
            SamplingSetting::None => None,
            SamplingSetting::Horizontal => Some(Sampling::Horizontal),
            SamplingSetting::Vertical => Some(Sampling::Vertical),
        }
    }
}

impl From<Option<Sampling>> for SamplingSetting {
    fn from(sampling: Option<Sampling>) -> Self {
        match sampling {
            None => Self::None,
            Some(Sampling::Horizontal) => Self::Horizontal,
            Some(Sampling::Vertical) => Self::Vertical,
        }
    }
}

impl fmt::Display for SamplingSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Option::<Sampling>::from(*self) {
            Some(sampling) => write!(f, "{sampling}"),
            None => f.write_str("none"),
        }
    }
}

/// Session defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Category browsed at startup
    #[serde(default = "default_bauteil_typ")]
    pub bauteil_typ: String,
    /// Sampling mode
    #[serde(default)]
    pub sampling: SamplingSetting,
    /// Debounce window for profile edits in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_bauteil_typ() -> String {
    "Aussenwand".to_string()
}

const fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bauteil_typ: default_bauteil_typ(),
            sampling: SamplingSetting::default(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl SessionConfig {
    /// Session options with the given initial profile.
    #[must_use]
    pub fn options(&self, profile: RequirementProfile) -> SessionOptions {
        SessionOptions {
            bauteil_typ: self.bauteil_typ.clone(),
            sampling: self.sampling.into(),
            debounce: Duration::from_millis(self.debounce_ms),
            profile,
        }
    }
}

/// Plot series colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Exact matches
    #[serde(default = "default_exact_color")]
    pub exact_color: String,
    /// Tolerance matches without their own color
    #[serde(default = "default_tolerance_color")]
    pub tolerance_color: String,
    /// Failures
    #[serde(default = "default_fail_color")]
    pub fail_color: String,
    /// Legend-only total series
    #[serde(default = "default_total_color")]
    pub total_color: String,
}

fn default_exact_color() -> String {
    PlotColors::default().exact
}

fn default_tolerance_color() -> String {
    PlotColors::default().tolerance
}

fn default_fail_color() -> String {
    PlotColors::default().fail
}

fn default_total_color() -> String {
    PlotColors::default().total
}

impl Default for PlotConfig {
    fn default() -> Self {
        let colors = PlotColors::default();
        Self {
            exact_color: colors.exact,
            tolerance_color: colors.tolerance,
            fail_color: colors.fail,
            total_color: colors.total,
        }
    }
}

impl From<&PlotConfig> for PlotColors {
    fn from(config: &PlotConfig) -> Self {
        Self {
            exact: config.exact_color.clone(),
            tolerance: config.tolerance_color.clone(),
            fail: config.fail_color.clone(),
            total: config.total_color.clone(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/Wallmatch/config.toml`
/// - macOS: `~/Library/Application Support/Wallmatch/config.toml`
/// - Windows: `%APPDATA%\Wallmatch\config.toml`
///
/// # Validation
///
/// - `api.base_url` must be an http(s) URL
/// - `api.timeout_secs` must be positive
/// - `session.debounce_ms` must be within 1-5000
/// - plot colors must not be empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Catalog service connection
    #[serde(default)]
    pub api: ApiConfig,
    /// Session defaults
    #[serde(default)]
    pub session: SessionConfig,
    /// Plot colors
    #[serde(default)]
    pub plot: PlotConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the config directory path.
    ///
    /// `WALLMATCH_CONFIG_DIR` takes precedence over the platform directory.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from `path`, falling back to defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `path` using temp file + rename.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).with_context(|| {
            format!("Failed to write temp config file: {}", temp_path.display())
        })?;

        // Atomic rename
        fs::rename(&temp_path, path).with_context(|| {
            format!("Failed to rename temp config file to: {}", path.display())
        })?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.api.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "API base URL must use http or https, got '{}'",
                url.scheme()
            );
        }

        if self.api.timeout_secs == 0 {
            anyhow::bail!("API timeout must be greater than 0 seconds");
        }

        if !DEBOUNCE_RANGE_MS.contains(&self.session.debounce_ms) {
            anyhow::bail!(
                "Debounce window must be between {} and {} ms, got {}",
                DEBOUNCE_RANGE_MS.start(),
                DEBOUNCE_RANGE_MS.end(),
                self.session.debounce_ms
            );
        }

        if self.session.bauteil_typ.trim().is_empty() {
            anyhow::bail!("Default category cannot be empty");
        }

        for (name, color) in [
            ("exact_color", &self.plot.exact_color),
            ("tolerance_color", &self.plot.tolerance_color),
            ("fail_color", &self.plot.fail_color),
            ("total_color", &self.plot.total_color),
        ] {
            if color.trim().is_empty() {
                anyhow::bail!("Plot color '{name}' cannot be empty");
            }
        }

        Ok(())
    }

    /// Plot colors for series construction.
    #[must_use]
    pub fn plot_colors(&self) -> PlotColors {
        PlotColors::from(&self.plot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.api.base_url, "http://localhost:5000/api/v1");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.session.bauteil_typ, "Aussenwand");
        assert_eq!(config.session.sampling, SamplingSetting::Horizontal);
        assert_eq!(
            config.session.options(RequirementProfile::default()).sampling,
            Some(Sampling::Horizontal)
        );
        assert_eq!(config.session.debounce_ms, 300);
        assert_eq!(config.plot.exact_color, "green");
    }

    #[test]
    fn test_config_validate() {
        assert!(Config::new().validate().is_ok());
    }

    #[test]
    fn test_config_validate_rejects_bad_values() {
        let mut config = Config::new();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.api.base_url = "localhost".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.session.debounce_ms = 0;
        assert!(config.validate().is_err());
        config.session.debounce_ms = 5001;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.plot.fail_color = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.api.base_url = "https://catalog.example.com/api/v1".to_string();
        config.session.sampling = SamplingSetting::None;
        config.session.debounce_ms = 150;
        config.save_to(&config_file).unwrap();

        assert!(!config_file.with_extension("toml.tmp").exists());
        let loaded = Config::load_from(&config_file).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.session.options(RequirementProfile::default()).sampling, None);
    }

    #[test]
    fn test_config_load_missing_file_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(loaded, Config::new());
    }

    #[test]
    fn test_config_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(
            &config_file,
            "[session]\nbauteil_typ = \"Innenwand\"\nsampling = \"vertical\"\n",
        )
        .unwrap();

        let loaded = Config::load_from(&config_file).unwrap();
        assert_eq!(loaded.session.bauteil_typ, "Innenwand");
        assert_eq!(loaded.session.sampling, SamplingSetting::Vertical);
        assert_eq!(loaded.session.debounce_ms, 300);
        assert_eq!(loaded.api, ApiConfig::default());
    }

    #[test]
    fn test_config_load_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(&config_file, "[api]\ntimeout_secs = 0\n").unwrap();
        assert!(Config::load_from(&config_file).is_err());
    }

    #[test]
    fn test_config_rejects_unknown_sampling() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(&config_file, "[session]\nsampling = \"diagonal\"\n").unwrap();
        let err = Config::load_from(&config_file).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    fn test_sampling_setting_conversions() {
        for sampling in [None, Some(Sampling::Horizontal), Some(Sampling::Vertical)] {
            assert_eq!(Option::<Sampling>::from(SamplingSetting::from(sampling)), sampling);
        }
        assert_eq!(SamplingSetting::None.to_string(), "none");
        assert_eq!(SamplingSetting::Vertical.to_string(), "vertical");

        let toml = toml::to_string(&SessionConfig::default()).unwrap();
        assert!(toml.contains("sampling = \"horizontal\""));
    }

    #[test]
    fn test_session_options() {
        let options = SessionConfig::default().options(RequirementProfile::default());
        assert_eq!(options.debounce, Duration::from_millis(300));
        assert_eq!(options.bauteil_typ, "Aussenwand");
    }
}
