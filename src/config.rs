//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the tide-config.toml file.
//! It provides a centralized way to configure the NOAA station, the observer's location
//! and clock, and the display layout.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "tide-config.toml";

/// Largest accepted panel side in pixels.
pub const MAX_DISPLAY_SIDE: u32 = 4096;

/// Configuration values that cannot be rendered with.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),

    #[error("timezone offset {0}h is outside [-14, 14]")]
    TimezoneOffset(f64),

    #[error("display size {width}x{height} is outside 1..={max} a side", max = MAX_DISPLAY_SIDE)]
    DisplaySize { width: u32, height: u32 },

    #[error("station id is empty")]
    StationId,
}

/// Application configuration loaded from tide-config.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// NOAA station configuration
    pub station: StationConfig,
    /// Where and when the chart is observed
    pub location: LocationConfig,
    /// Display and layout configuration
    pub display: DisplayConfig,
}

/// NOAA tide station configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StationConfig {
    /// NOAA station ID (e.g., "8418150" for Portland, ME)
    pub id: String,
    /// Human-readable name, used in logs
    pub nickname: String,
}

/// Observer location and clock
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Degrees north
    pub latitude: f64,
    /// Degrees east (west is negative)
    pub longitude: f64,
    /// Signed offset from UTC in hours, e.g. -5 for EST or 5.5 for IST
    pub tz_offset_hours: f64,
}

/// How clock times are written on the chart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum TimeFormat {
    /// "3:15pm", hour labels 1-12
    #[serde(rename = "12")]
    TwelveHour,
    /// "15:15", hour labels 1-23
    #[default]
    #[serde(rename = "24")]
    TwentyFourHour,
}

impl TimeFormat {
    /// Label for an hour tick (0-23).
    pub fn hour_label(self, hour: u32) -> String {
        match self {
            TimeFormat::TwelveHour => match hour % 12 {
                0 => "12".to_string(),
                h => h.to_string(),
            },
            TimeFormat::TwentyFourHour => hour.to_string(),
        }
    }

    /// Clock reading of a local instant.
    pub fn clock(self, local: &DateTime<FixedOffset>) -> String {
        match self {
            TimeFormat::TwelveHour => local.format("%-I:%M%p").to_string().to_lowercase(),
            TimeFormat::TwentyFourHour => local.format("%H:%M").to_string(),
        }
    }
}

/// Display and visualization configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Panel width in pixels
    pub width: u32,
    /// Panel height in pixels
    pub height: u32,
    /// 12 or 24 hour clock
    pub time_format: TimeFormat,
    /// Moon disc radius in pixels
    pub moon_radius: u32,
    /// Distance of the moon disc from the top-left corner
    pub padding: i32,
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            id: "8418150".to_string(),
            nickname: "Portland, ME".to_string(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        LocationConfig {
            latitude: 43.6591,
            longitude: -70.2568,
            tz_offset_hours: -5.0,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            width: 600,  // Inky Impression 5.7"
            height: 448, // Inky Impression 5.7"
            time_format: TimeFormat::TwentyFourHour,
            moon_radius: 40,
            padding: 30,
        }
    }
}

impl Config {
    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(station = %config.station.nickname, "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save current configuration to `path`
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let loc = &self.location;
        if !(-90.0..=90.0).contains(&loc.latitude) {
            return Err(ConfigError::Latitude(loc.latitude));
        }
        if !(-180.0..=180.0).contains(&loc.longitude) {
            return Err(ConfigError::Longitude(loc.longitude));
        }
        if !(-14.0..=14.0).contains(&loc.tz_offset_hours) {
            return Err(ConfigError::TimezoneOffset(loc.tz_offset_hours));
        }
        let side_ok = |side: u32| (1..=MAX_DISPLAY_SIDE).contains(&side);
        if !side_ok(self.display.width) || !side_ok(self.display.height) {
            return Err(ConfigError::DisplaySize {
                width: self.display.width,
                height: self.display.height,
            });
        }
        if self.station.id.trim().is_empty() {
            return Err(ConfigError::StationId);
        }
        Ok(())
    }

    /// The configured UTC offset, rounded to the second.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        let hours = self.location.tz_offset_hours;
        let seconds = (hours * 3600.0).round();
        if !(-14.0..=14.0).contains(&hours) {
            return Err(ConfigError::TimezoneOffset(hours));
        }
        FixedOffset::east_opt(seconds as i32).ok_or(ConfigError::TimezoneOffset(hours))
    }
}
