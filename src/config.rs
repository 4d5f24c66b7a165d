//! Dashboard configuration.
//!
//! Loaded from a TOML file (`market-lens.toml` by default). Every section is
//! optional; a missing file means all defaults.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::model::{InvalidDatePolicy, LoadOptions};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub filters: FilterDefaults,

    #[serde(default)]
    pub map: MapConfig,
}

/// Where the sales CSV lives and how to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,

    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: char,

    #[serde(default)]
    pub invalid_dates: InvalidDatePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDefaults {
    /// The default start date is never earlier than this.
    #[serde(default = "default_start_date_floor")]
    pub start_date_floor: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// An extra marker drawn on the map, e.g. the plot being appraised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<MapMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data.csv")
}

fn default_thousands_separator() -> char {
    ','
}

fn default_start_date_floor() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2022, 1, 1)
}

fn default_zoom() -> u8 {
    14
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            thousands_separator: default_thousands_separator(),
            invalid_dates: InvalidDatePolicy::default(),
        }
    }
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            start_date_floor: default_start_date_floor(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            highlight: None,
        }
    }
}

impl DataConfig {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            thousands_separator: self.thousands_separator,
            invalid_dates: self.invalid_dates,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, DashboardError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| DashboardError::ConfigRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config = Self::from_toml(&content).map_err(|e| match e {
            DashboardError::ConfigParse { reason, .. } => DashboardError::ConfigParse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, DashboardError> {
        let config: Self = toml::from_str(content).map_err(|e| DashboardError::ConfigParse {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        let sep = self.data.thousands_separator;
        if sep.is_ascii_digit() || matches!(sep, '-' | '+' | 'e' | 'E') {
            return Err(DashboardError::Validation(format!(
                "thousands_separator {sep:?} collides with number syntax"
            )));
        }

        if self.map.zoom > 22 {
            return Err(DashboardError::Validation(
                "map.zoom must be between 0 and 22".into(),
            ));
        }

        if let Some(marker) = &self.map.highlight {
            if !(-90.0..=90.0).contains(&marker.latitude)
                || !(-180.0..=180.0).contains(&marker.longitude)
            {
                return Err(DashboardError::Validation(format!(
                    "map.highlight '{}' has out-of-range coordinates",
                    marker.label
                )));
            }
        }

        Ok(())
    }

    /// Render the defaults as a TOML document.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}
