//! Live waveform monitoring feature for oscope.
//!
//! Presentation only: the chart widget and the terminal UI around it.
//! Acquisition lives in [`crate::capture`].

pub mod ui;
pub mod waveform;

pub use ui::{MonitorCommand, MonitorStatus, MonitorTui};
