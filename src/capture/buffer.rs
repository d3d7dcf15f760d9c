//! Waveform sample history.
//!
//! An ordered series of normalized amplitudes backing the visible waveform.
//! Retention is an explicit policy: unbounded growth matches the original
//! behavior and is acceptable for short sessions only; bounded retention
//! keeps the most recent N samples with ring semantics so memory stays flat
//! for arbitrarily long sessions.

use std::collections::VecDeque;

/// How much sample history the buffer keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// Grow forever. Short-lived sessions only.
    Unbounded,
    /// Keep at most this many samples, silently evicting the oldest.
    Recent(usize),
}

/// Append-only sample series read by the renderer.
///
/// Appended by the decode step and read by the render step of the same
/// logical task; nothing here is shared across threads. Only the raw byte
/// queue in the capture source crosses the audio-callback boundary.
#[derive(Debug)]
pub struct WaveformBuffer {
    samples: VecDeque<f64>,
    retention: Retention,
}

impl WaveformBuffer {
    pub fn new(retention: Retention) -> Self {
        let samples = match retention {
            Retention::Unbounded => VecDeque::new(),
            Retention::Recent(capacity) => VecDeque::with_capacity(capacity),
        };
        WaveformBuffer { samples, retention }
    }

    /// Appends a decoded batch, preserving intra-batch order.
    ///
    /// Under bounded retention the oldest samples are evicted once the
    /// capacity is exceeded; the newest data always survives.
    pub fn append(&mut self, batch: &[f64]) {
        self.samples.extend(batch.iter().copied());
        if let Retention::Recent(capacity) = self.retention {
            while self.samples.len() > capacity {
                self.samples.pop_front();
            }
        }
    }

    /// Returns a copy of the current series in temporal order, oldest first.
    pub fn snapshot(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(range: std::ops::Range<i32>) -> Vec<f64> {
        range.map(f64::from).collect()
    }

    #[test]
    fn unbounded_append_is_monotonic() {
        let mut buffer = WaveformBuffer::new(Retention::Unbounded);
        buffer.append(&batch(0..5));
        buffer.append(&[]);
        buffer.append(&batch(5..8));
        assert_eq!(buffer.len(), 8);
        assert_eq!(buffer.snapshot(), batch(0..8));
    }

    #[test]
    fn snapshot_preserves_arrival_order_across_batches() {
        let mut buffer = WaveformBuffer::new(Retention::Unbounded);
        buffer.append(&[0.5, -0.5]);
        buffer.append(&[0.25]);
        buffer.append(&[-1.0, 1.0]);
        assert_eq!(buffer.snapshot(), vec![0.5, -0.5, 0.25, -1.0, 1.0]);
    }

    #[test]
    fn bounded_retention_keeps_most_recent_samples() {
        let mut buffer = WaveformBuffer::new(Retention::Recent(4));
        buffer.append(&batch(0..3));
        assert_eq!(buffer.len(), 3);
        buffer.append(&batch(3..6));
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.snapshot(), batch(2..6));
    }

    #[test]
    fn bounded_retention_caps_length_at_capacity() {
        let mut buffer = WaveformBuffer::new(Retention::Recent(10));
        for start in 0..20 {
            buffer.append(&batch(start..start + 3));
            assert!(buffer.len() <= 10);
        }
        assert_eq!(buffer.len(), 10);
    }

    #[test]
    fn oversized_batch_keeps_only_its_tail() {
        let mut buffer = WaveformBuffer::new(Retention::Recent(3));
        buffer.append(&batch(0..8));
        assert_eq!(buffer.snapshot(), batch(5..8));
    }

    #[test]
    fn zero_capacity_retains_nothing() {
        let mut buffer = WaveformBuffer::new(Retention::Recent(0));
        buffer.append(&batch(0..4));
        assert!(buffer.is_empty());
    }

    #[test]
    fn fresh_buffer_is_empty() {
        let buffer = WaveformBuffer::new(Retention::Unbounded);
        assert!(buffer.is_empty());
        assert!(buffer.snapshot().is_empty());
    }
}
