//! Configuration management for oscope.
//!
//! Application configuration lives in a TOML file in the user's config
//! directory (`~/.config/oscope/oscope.toml`). All fields have defaults,
//! so a missing file is not an error.

pub mod file;

pub use file::{get_config_path, AudioConfig, AxisMode, DisplayConfig, OscopeConfig};
