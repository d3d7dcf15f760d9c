//! Configuration file management for oscope.
//!
//! Loads and saves application configuration from a TOML file in the
//! user's config directory. A missing file means defaults; only a file
//! that exists but fails to parse is an error.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::capture::Retention;

/// X/Y axis policy for the waveform display.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AxisMode {
    /// Static [0,1]×[-1,1] range regardless of data extent
    #[default]
    Fixed,
    /// Y range rescaled to the current series extent each render
    Fit,
}

impl std::fmt::Display for AxisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Fit => write!(f, "fit"),
        }
    }
}

/// Audio input configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device. Capture always uses the system default input; this
    /// field is informational and reserved (see `oscope list-devices`).
    #[serde(default = "default_device")]
    pub device: String,
}

fn default_device() -> String {
    "default".to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            device: default_device(),
        }
    }
}

/// Waveform display configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Seconds of waveform history to retain. 0 disables eviction and the
    /// series grows for the whole session (short sessions only).
    #[serde(default = "default_retain_seconds")]
    pub retain_seconds: f64,
    /// Axis policy: "fixed" or "fit"
    #[serde(default)]
    pub axis: AxisMode,
    /// Display refresh rate in frames per second
    #[serde(default = "default_fps")]
    pub fps: u16,
}

fn default_retain_seconds() -> f64 {
    2.0
}

fn default_fps() -> u16 {
    30
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            retain_seconds: default_retain_seconds(),
            axis: AxisMode::default(),
            fps: default_fps(),
        }
    }
}

impl DisplayConfig {
    /// Retention policy for the given capture rate: capacity is retained
    /// duration times sample rate.
    pub fn retention(&self, sample_rate_hz: u32) -> Retention {
        if self.retain_seconds <= 0.0 {
            Retention::Unbounded
        } else {
            Retention::Recent((self.retain_seconds * f64::from(sample_rate_hz)) as usize)
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OscopeConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl OscopeConfig {
    /// Loads configuration, falling back to defaults when no file exists.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If an existing config file cannot be read or parsed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(OscopeConfig::default());
        }
        let content = fs::read_to_string(&config_path)?;
        let config: OscopeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the config file, creating the directory if needed.
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    let config_path = home.join(".config").join("oscope").join("oscope.toml");

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_bounded_retention_and_fixed_axis() {
        let config = OscopeConfig::default();
        assert_eq!(config.display.axis, AxisMode::Fixed);
        assert_eq!(config.display.retention(44_100), Retention::Recent(88_200));
        assert_eq!(config.display.fps, 30);
    }

    #[test]
    fn zero_retain_seconds_means_unbounded() {
        let display = DisplayConfig {
            retain_seconds: 0.0,
            ..DisplayConfig::default()
        };
        assert_eq!(display.retention(44_100), Retention::Unbounded);
    }

    #[test]
    fn empty_toml_parses_to_defaults() {
        let config: OscopeConfig = toml::from_str("").unwrap();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.display.axis, AxisMode::Fixed);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: OscopeConfig =
            toml::from_str("[display]\nretain_seconds = 0.5\naxis = \"fit\"\n").unwrap();
        assert_eq!(config.display.axis, AxisMode::Fit);
        assert_eq!(config.display.retention(44_100), Retention::Recent(22_050));
        assert_eq!(config.display.fps, 30);
        assert_eq!(config.audio.device, "default");
    }
}
