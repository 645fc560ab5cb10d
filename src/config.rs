//! Configuration for the detect-and-transform pipeline
//!
//! Loaded from TOML; every section and field is optional and falls back to defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::ConfigError;

/// Environment variable naming a config file for the CLI
pub const CONFIG_ENV_VAR: &str = "CLIPFORM_CONFIG";

/// Largest accepted `units.precision`
pub const MAX_PRECISION: usize = 10;

/// Ids of the built-in detectors, in registration order
pub const DETECTOR_IDS: &[&str] = &[
    "date_range",
    "phone",
    "rating",
    "combinations",
    "arithmetic",
    "units",
    "time_calc",
    "navigation",
];

/// Arithmetic output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArithmeticOptions {
    /// Output template with `${input}`, `${result}`, `${numeric}` placeholders
    pub template: Option<String>,
}

/// Disability-rating lookup settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RatingOptions {
    /// Dollars paid per week of rating
    pub weekly_rate: f64,
}

impl Default for RatingOptions {
    fn default() -> Self {
        Self { weekly_rate: 290.0 }
    }
}

/// Unit conversion settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UnitOptions {
    /// Decimal places kept in converted values
    pub precision: usize,
}

impl Default for UnitOptions {
    fn default() -> Self {
        Self { precision: 4 }
    }
}

/// Navigation (URL, path, web search) settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavigationOptions {
    pub enabled: bool,
    /// Search URL; `${query}` is replaced with the URL-encoded text
    pub search_url: String,
    /// Longest text that falls back to a web search
    pub max_search_length: usize,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            search_url: "https://www.google.com/search?q=${query}".to_string(),
            max_search_length: 200,
        }
    }
}

/// Detector selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorOptions {
    /// Detector ids left out of the standard registry
    pub disabled: Vec<String>,
}

/// Read-only configuration snapshot handed to formatters and detectors
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub arithmetic: ArithmeticOptions,
    pub rating: RatingOptions,
    pub units: UnitOptions,
    pub navigation: NavigationOptions,
    pub detectors: DetectorOptions,
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Config = toml::from_str(source).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&source)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Check value ranges and cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.rating.weekly_rate;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConfigError::InvalidWeeklyRate(rate));
        }

        if self.units.precision > MAX_PRECISION {
            return Err(ConfigError::PrecisionTooLarge {
                got: self.units.precision,
                max: MAX_PRECISION,
            });
        }

        if !self.navigation.search_url.contains("${query}") {
            return Err(ConfigError::SearchUrlMissingQuery(
                self.navigation.search_url.clone(),
            ));
        }

        if let Some(unknown) = self
            .detectors
            .disabled
            .iter()
            .find(|id| !DETECTOR_IDS.contains(&id.as_str()))
        {
            return Err(ConfigError::UnknownDetector(unknown.clone()));
        }

        Ok(())
    }

    pub fn is_disabled(&self, detector_id: &str) -> bool {
        self.detectors.disabled.iter().any(|id| id == detector_id)
    }
}
