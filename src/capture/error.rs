//! Error taxonomy for the capture pipeline.
//!
//! Negotiation and open-time errors abort startup before any buffer is
//! allocated. Mid-session errors stop the pipeline; the last rendered
//! waveform stays on screen. An odd trailing byte in a read is not an
//! error at all: the decoder drops it and logs at debug level.

use crate::capture::format::CaptureFormat;

/// Errors raised by the capture pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The default input device does not support the fixed target format.
    /// No device handle is opened in this case.
    #[error("input device does not support {0} (exact match required, no fallback)")]
    UnsupportedFormat(CaptureFormat),

    /// No usable default input device on this system.
    #[error("no default audio input device available")]
    DeviceUnavailable,

    /// The stream reported an error or the device was lost mid-session.
    /// Fatal to the current session; there is no automatic retry.
    #[error("audio capture interrupted: {0}")]
    CaptureInterrupted(String),

    /// The platform audio backend failed outside of the cases above.
    #[error("audio backend error: {0}")]
    Backend(String),
}
