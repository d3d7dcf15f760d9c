//! PCM sample decoding.
//!
//! Converts raw little-endian signed 16-bit PCM bytes into normalized
//! f64 amplitudes. Pure: no shared state, no carry-over between calls.

/// Maximum representable magnitude of a signed 16-bit sample.
///
/// Division by 32767 means i16::MIN decodes slightly below -1.0
/// (≈ -1.0000305); that value is deliberately not clamped.
const I16_MAX_AMPLITUDE: f64 = 32_767.0;

/// Decodes `bytes` as consecutive s16le samples normalized to ≈[-1.0, 1.0].
///
/// A trailing odd byte cannot form a sample; it is dropped for this call
/// (never buffered) and noted at debug level.
pub fn decode(bytes: &[u8]) -> Vec<f64> {
    let mut samples = Vec::with_capacity(bytes.len() / 2);
    let mut chunks = bytes.chunks_exact(2);
    for pair in &mut chunks {
        let value = i16::from_le_bytes([pair[0], pair[1]]);
        samples.push(f64::from(value) / I16_MAX_AMPLITUDE);
    }
    if !chunks.remainder().is_empty() {
        tracing::debug!(
            "Dropping {} trailing byte(s) of a split sample",
            chunks.remainder().len()
        );
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_zero_and_full_scale() {
        let samples = decode(&[0x00, 0x00, 0xFF, 0x7F]);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[1], 1.0);
    }

    #[test]
    fn negative_full_scale_is_not_clamped() {
        // i16::MIN / 32767 lands just below -1.0.
        let samples = decode(&[0x00, 0x80]);
        assert_eq!(samples.len(), 1);
        assert!(samples[0] < -1.0);
        assert!((samples[0] - (-32_768.0 / 32_767.0)).abs() < 1e-12);
        assert!((samples[0] - (-1.000_030_5)).abs() < 1e-6);
    }

    #[test]
    fn every_sample_stays_in_normalized_range() {
        for value in [i16::MIN, -32_767, -1, 0, 1, 12_345, i16::MAX] {
            let bytes = value.to_le_bytes();
            let samples = decode(&bytes);
            assert_eq!(samples[0], f64::from(value) / 32_767.0);
            assert!(samples[0] >= -32_768.0 / 32_767.0);
            assert!(samples[0] <= 1.0);
        }
    }

    #[test]
    fn odd_trailing_byte_is_dropped() {
        let samples = decode(&[0x01, 0x00, 0x02, 0x00, 0xAB]);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], 1.0 / 32_767.0);
        assert_eq!(samples[1], 2.0 / 32_767.0);
    }

    #[test]
    fn single_byte_decodes_to_nothing() {
        assert!(decode(&[0xFF]).is_empty());
    }

    #[test]
    fn empty_input_decodes_to_nothing() {
        assert!(decode(&[]).is_empty());
    }

    #[test]
    fn samples_keep_byte_order() {
        // 0x0100 = 256, 0x0001 = 1: little-endian pairs must not swap.
        let samples = decode(&[0x00, 0x01, 0x01, 0x00]);
        assert_eq!(samples[0], 256.0 / 32_767.0);
        assert_eq!(samples[1], 1.0 / 32_767.0);
    }
}
