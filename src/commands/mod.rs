//! Application command handlers for oscope.
//!
//! Each submodule handles one CLI command.
//!
//! # Commands
//! - `monitor`: live waveform monitoring of the default input (default command)
//! - `list_devices`: list available audio input devices
//! - `config`: open configuration file in the user's preferred editor
//! - `logs`: display recent log entries

pub mod config;
pub mod list_devices;
pub mod logs;
pub mod monitor;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use monitor::handle_monitor;
