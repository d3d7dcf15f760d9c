//! Capture pipeline orchestration.
//!
//! Wires negotiation, the capture source, the decoder, and the waveform
//! buffer into one state machine:
//!
//! ```text
//! Uninitialized → Negotiated → Capturing → (Stopped | Failed)
//! ```
//!
//! `Failed` is terminal and reachable from any state; `Stopped` only via
//! explicit teardown. Decode, append, and render all run on the caller's
//! task, one tick at a time, so samples land in the buffer in strict
//! arrival order and a tick is never re-entered.

use crate::capture::buffer::{Retention, WaveformBuffer};
use crate::capture::decode::decode;
use crate::capture::error::CaptureError;
use crate::capture::format::{negotiate, CaptureFormat, NegotiatedInput};
use crate::capture::source::{CaptureSource, RawFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Negotiated,
    Capturing,
    Stopped,
    Failed,
}

/// The acquisition side of the oscilloscope, free of any presentation
/// concern. The UI owns layout and redraw; this owns the device and the
/// sample history.
pub struct Pipeline {
    state: PipelineState,
    negotiated: Option<NegotiatedInput>,
    source: Option<CaptureSource>,
    frame: Option<RawFrame>,
    buffer: WaveformBuffer,
}

impl Pipeline {
    pub fn new(retention: Retention) -> Self {
        Pipeline {
            state: PipelineState::Uninitialized,
            negotiated: None,
            source: None,
            frame: None,
            buffer: WaveformBuffer::new(retention),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Negotiates the fixed capture format against the default device.
    ///
    /// On failure the pipeline is `Failed` and nothing was opened or
    /// allocated.
    pub fn negotiate(&mut self) -> Result<CaptureFormat, CaptureError> {
        debug_assert_eq!(self.state, PipelineState::Uninitialized);
        match negotiate() {
            Ok(negotiated) => {
                let format = negotiated.format;
                self.negotiated = Some(negotiated);
                self.state = PipelineState::Negotiated;
                Ok(format)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Opens the device and allocates the period-sized read frame.
    ///
    /// Only now does any capture resource exist.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        debug_assert_eq!(self.state, PipelineState::Negotiated);
        let negotiated = match self.negotiated.as_ref() {
            Some(negotiated) => negotiated,
            None => {
                return Err(self.fail(CaptureError::Backend(
                    "start() before negotiate()".to_string(),
                )))
            }
        };
        match CaptureSource::open(negotiated) {
            Ok(source) => {
                self.frame = Some(source.new_frame());
                self.source = Some(source);
                self.state = PipelineState::Capturing;
                tracing::info!("Capture started");
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// One capture tick: drain everything ready, decode, append.
    ///
    /// Returns the number of samples appended this tick; 0 without error on
    /// a spurious wake. A stream failure marks the pipeline `Failed` and is
    /// returned; already-appended history stays readable.
    pub fn poll(&mut self) -> Result<usize, CaptureError> {
        self.drain(true)
    }

    /// Like [`Pipeline::poll`], but discards pending audio instead of
    /// appending it. Used while the display is paused so the backlog never
    /// floods.
    pub fn poll_discard(&mut self) -> Result<(), CaptureError> {
        self.drain(false).map(|_| ())
    }

    fn drain(&mut self, keep: bool) -> Result<usize, CaptureError> {
        // Disjoint field borrows: source and frame feed the buffer directly.
        let (source, frame) = match (self.source.as_ref(), self.frame.as_mut()) {
            (Some(source), Some(frame)) => (source, frame),
            _ => return Ok(0),
        };
        let buffer = &mut self.buffer;

        let mut appended = 0;
        let failure = loop {
            match source.read_available(frame) {
                Ok(0) => break None,
                Ok(count) => {
                    if keep {
                        appended += ingest(buffer, frame.filled(count));
                    }
                }
                Err(e) => break Some(e),
            }
        };

        match failure {
            Some(e) => Err(self.fail(e)),
            None => Ok(appended),
        }
    }

    /// Explicit session teardown: stops deliveries, releases the device,
    /// and leaves the buffer in its final readable state.
    pub fn stop(&mut self) {
        self.release();
        if self.state != PipelineState::Failed {
            self.state = PipelineState::Stopped;
        }
        tracing::info!("Capture stopped, {} samples retained", self.buffer.len());
    }

    /// Read-only copy of the current series for rendering.
    pub fn snapshot(&self) -> Vec<f64> {
        self.buffer.snapshot()
    }

    pub fn sample_count(&self) -> usize {
        self.buffer.len()
    }

    /// Terminal failure: release the device, keep the history.
    fn fail(&mut self, e: CaptureError) -> CaptureError {
        self.release();
        self.state = PipelineState::Failed;
        e
    }

    fn release(&mut self) {
        self.source = None;
        self.frame = None;
    }
}

/// Decodes one read's worth of bytes and appends the result in order.
fn ingest(buffer: &mut WaveformBuffer, bytes: &[u8]) -> usize {
    let samples = decode(bytes);
    buffer.append(&samples);
    samples.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pipeline_is_uninitialized_and_empty() {
        let pipeline = Pipeline::new(Retention::Unbounded);
        assert_eq!(pipeline.state(), PipelineState::Uninitialized);
        assert!(pipeline.snapshot().is_empty());
    }

    #[test]
    fn poll_without_open_source_is_a_quiet_no_op() {
        let mut pipeline = Pipeline::new(Retention::Unbounded);
        assert_eq!(pipeline.poll().unwrap(), 0);
        assert_eq!(pipeline.state(), PipelineState::Uninitialized);
    }

    #[test]
    fn stop_is_explicit_teardown_to_stopped() {
        let mut pipeline = Pipeline::new(Retention::Unbounded);
        pipeline.stop();
        assert_eq!(pipeline.state(), PipelineState::Stopped);
        assert!(pipeline.snapshot().is_empty());
    }

    #[test]
    fn failure_is_terminal_and_preserves_history() {
        let mut pipeline = Pipeline::new(Retention::Unbounded);
        ingest(&mut pipeline.buffer, &[0x00, 0x00, 0xFF, 0x7F]);

        let e = pipeline.fail(CaptureError::CaptureInterrupted("gone".to_string()));
        assert!(matches!(e, CaptureError::CaptureInterrupted(_)));
        assert_eq!(pipeline.state(), PipelineState::Failed);

        // The last decoded waveform stays readable for a final render,
        // and even an explicit stop does not leave the terminal state.
        assert_eq!(pipeline.snapshot(), vec![0.0, 1.0]);
        pipeline.stop();
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert_eq!(pipeline.sample_count(), 2);
    }

    #[test]
    fn ingest_appends_decoded_samples_in_order() {
        let mut buffer = WaveformBuffer::new(Retention::Unbounded);
        assert_eq!(ingest(&mut buffer, &[0x01, 0x00, 0x02, 0x00]), 2);
        assert_eq!(ingest(&mut buffer, &[0x03, 0x00, 0xAB]), 1);
        assert_eq!(
            buffer.snapshot(),
            vec![1.0 / 32_767.0, 2.0 / 32_767.0, 3.0 / 32_767.0]
        );
    }
}
