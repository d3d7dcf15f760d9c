//! Audio capture source.
//!
//! Opens the negotiated device as a raw-byte input stream. The OS audio
//! callback is the single producer: it appends each delivered period of
//! little-endian PCM bytes to a mutex-guarded pending queue and returns.
//! The application task is the single consumer: `read_available` drains
//! pending bytes into a reusable [`RawFrame`] without blocking.
//!
//! The pending queue is bounded. If the consumer stalls longer than the
//! backlog window the oldest bytes are discarded, so a slow render can
//! never grow memory or stall the device callback.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, StreamTrait};

use crate::capture::error::CaptureError;
use crate::capture::format::NegotiatedInput;

/// Backlog window in whole periods. At the 44100 Hz mono target this is
/// well under a second of audio.
const MAX_PENDING_PERIODS: usize = 8;

/// Fallback period size in bytes when the device will not say.
const DEFAULT_PERIOD_BYTES: usize = 4096;

/// Reusable read buffer sized to the device period.
///
/// Contents are transient: every `read_available` overwrites them.
pub struct RawFrame {
    buf: Vec<u8>,
}

impl RawFrame {
    pub fn new(capacity: usize) -> Self {
        RawFrame {
            buf: vec![0; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The first `count` bytes filled by the most recent read.
    pub fn filled(&self, count: usize) -> &[u8] {
        &self.buf[..count]
    }
}

struct Shared {
    pending: Mutex<VecDeque<u8>>,
    interrupted: AtomicBool,
    interrupt_reason: Mutex<Option<String>>,
}

/// An open capture stream over the negotiated device.
///
/// Dropping the source stops readiness deliveries and releases the device.
pub struct CaptureSource {
    // Held for its Drop: the stream dies with the source.
    _stream: cpal::Stream,
    shared: Arc<Shared>,
    period_bytes: usize,
}

impl CaptureSource {
    /// Opens the device for the negotiated format and starts delivery.
    pub fn open(negotiated: &NegotiatedInput) -> Result<Self, CaptureError> {
        let period_bytes = period_bytes(&negotiated.stream_config, negotiated.format.bytes_per_sample());
        let max_pending = period_bytes * MAX_PENDING_PERIODS;

        let shared = Arc::new(Shared {
            pending: Mutex::new(VecDeque::with_capacity(max_pending)),
            interrupted: AtomicBool::new(false),
            interrupt_reason: Mutex::new(None),
        });

        let producer = Arc::clone(&shared);
        let on_error = Arc::clone(&shared);
        let sample_format = negotiated.stream_config.sample_format();
        let stream_config: cpal::StreamConfig = negotiated.stream_config.config();

        let stream = negotiated
            .device
            .build_input_stream_raw(
                &stream_config,
                sample_format,
                move |data: &cpal::Data, _: &cpal::InputCallbackInfo| {
                    let mut pending = producer.pending.lock().unwrap();
                    pending.extend(data.bytes().iter().copied());
                    let excess = pending.len().saturating_sub(max_pending);
                    if excess > 0 {
                        // Consumer is behind; keep only the freshest backlog.
                        pending.drain(..excess);
                    }
                },
                move |err: cpal::StreamError| {
                    tracing::error!("Audio stream error: {}", err);
                    *on_error.interrupt_reason.lock().unwrap() = Some(err.to_string());
                    on_error.interrupted.store(true, Ordering::Release);
                },
                None,
            )
            .map_err(map_build_error)?;

        stream.play().map_err(|e| match e {
            cpal::PlayStreamError::DeviceNotAvailable => CaptureError::DeviceUnavailable,
            other => CaptureError::Backend(other.to_string()),
        })?;

        tracing::debug!(
            "Capture stream started, period {} bytes, backlog cap {} bytes",
            period_bytes,
            max_pending
        );

        Ok(CaptureSource {
            _stream: stream,
            shared,
            period_bytes,
        })
    }

    /// Allocates a frame matching the device period, the device-chosen
    /// read granularity.
    pub fn new_frame(&self) -> RawFrame {
        RawFrame::new(self.period_bytes)
    }

    /// Drains up to one frame of pending bytes, returning the count filled.
    ///
    /// Non-blocking: returns `Ok(0)` when nothing is ready (spurious wake
    /// included). Pending data is delivered even after an interruption;
    /// `CaptureInterrupted` is surfaced once the backlog is empty.
    pub fn read_available(&self, frame: &mut RawFrame) -> Result<usize, CaptureError> {
        let count = {
            let mut pending = self.shared.pending.lock().unwrap();
            let count = pending.len().min(frame.buf.len());
            for (slot, byte) in frame.buf.iter_mut().zip(pending.drain(..count)) {
                *slot = byte;
            }
            count
        };

        if count == 0 && self.shared.interrupted.load(Ordering::Acquire) {
            let reason = self
                .shared
                .interrupt_reason
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| "stream closed".to_string());
            return Err(CaptureError::CaptureInterrupted(reason));
        }

        Ok(count)
    }
}

fn map_build_error(err: cpal::BuildStreamError) -> CaptureError {
    match err {
        cpal::BuildStreamError::DeviceNotAvailable => CaptureError::DeviceUnavailable,
        other => CaptureError::Backend(other.to_string()),
    }
}

/// Derives the period size from what the device reports. The device picks
/// the granularity, not the caller; the frame only has to be large enough
/// to swallow one delivery.
fn period_bytes(config: &cpal::SupportedStreamConfig, bytes_per_sample: usize) -> usize {
    match config.buffer_size() {
        cpal::SupportedBufferSize::Range { min, max } => {
            let frames = (*max).min(4096).max(*min) as usize;
            frames * bytes_per_sample
        }
        cpal::SupportedBufferSize::Unknown => DEFAULT_PERIOD_BYTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_frame_reports_capacity_and_filled_prefix() {
        let mut frame = RawFrame::new(8);
        assert_eq!(frame.capacity(), 8);
        frame.buf[..3].copy_from_slice(&[1, 2, 3]);
        assert_eq!(frame.filled(3), &[1, 2, 3]);
        assert!(frame.filled(0).is_empty());
    }
}
