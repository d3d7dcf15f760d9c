//! Capture format negotiation.
//!
//! The pipeline records one fixed format: 44100 Hz, mono, 16-bit signed
//! little-endian PCM. Negotiation is exact-match with no fallback and no
//! downmix: if the default input device does not report the target format
//! as supported, negotiation fails with `UnsupportedFormat` and no device
//! handle is opened. The match itself is a plain function over a list of
//! supported formats so it can be exercised without audio hardware.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::SampleFormat;

use crate::capture::error::CaptureError;
use crate::capture::suppress_alsa_stderr;

/// Byte order of a PCM sample on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Numeric encoding of a PCM sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEncoding {
    SignedInt,
    UnsignedInt,
    Float,
}

/// A concrete PCM capture format, constructed once at startup and
/// immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    pub sample_rate_hz: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub byte_order: ByteOrder,
    pub encoding: SampleEncoding,
}

impl CaptureFormat {
    /// The fixed target format: 44100 Hz mono s16le.
    pub const TARGET: CaptureFormat = CaptureFormat {
        sample_rate_hz: 44_100,
        channels: 1,
        bits_per_sample: 16,
        byte_order: ByteOrder::Little,
        encoding: SampleEncoding::SignedInt,
    };

    /// Bytes per decoded sample frame (mono, so frame == sample).
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample) / 8
    }
}

impl std::fmt::Display for CaptureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let order = match self.byte_order {
            ByteOrder::Little => "le",
            ByteOrder::Big => "be",
        };
        let encoding = match self.encoding {
            SampleEncoding::SignedInt => "s",
            SampleEncoding::UnsignedInt => "u",
            SampleEncoding::Float => "f",
        };
        write!(
            f,
            "{}Hz/{}ch/{}{}{}",
            self.sample_rate_hz, self.channels, encoding, self.bits_per_sample, order
        )
    }
}

/// A successfully negotiated input: the device plus the cpal stream config
/// matching [`CaptureFormat::TARGET`]. Holding this does not open a stream.
pub struct NegotiatedInput {
    pub device: cpal::Device,
    pub stream_config: cpal::SupportedStreamConfig,
    pub format: CaptureFormat,
}

/// Exact-match selection over a device's reported capability set.
///
/// Returns the target format only if it appears verbatim in `supported`.
pub fn select_exact(
    supported: impl IntoIterator<Item = CaptureFormat>,
) -> Result<CaptureFormat, CaptureError> {
    let target = CaptureFormat::TARGET;
    if supported.into_iter().any(|f| f == target) {
        Ok(target)
    } else {
        Err(CaptureError::UnsupportedFormat(target))
    }
}

/// Negotiates the fixed target format against the system default input device.
///
/// Queries the device capability set and nothing more: on failure no device
/// is opened and no buffers are allocated.
pub fn negotiate() -> Result<NegotiatedInput, CaptureError> {
    let (device, ranges) = suppress_alsa_stderr(|| {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::DeviceUnavailable)?;
        let ranges: Vec<cpal::SupportedStreamConfigRange> = device
            .supported_input_configs()
            .map_err(|e| CaptureError::Backend(e.to_string()))?
            .collect();
        Ok((device, ranges))
    })?;

    let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());
    tracing::info!("Negotiating {} against '{}'", CaptureFormat::TARGET, device_name);

    // A cpal config range collapses to a concrete format only if the target
    // rate falls inside it; everything else is reported as-is and rejected
    // by the exact match.
    let target_rate = cpal::SampleRate(CaptureFormat::TARGET.sample_rate_hz);
    let mut stream_config = None;
    let candidates: Vec<CaptureFormat> = ranges
        .iter()
        .filter_map(|range| {
            let concrete = range.clone().try_with_sample_rate(target_rate)?;
            let format = describe(&concrete)?;
            if format == CaptureFormat::TARGET && stream_config.is_none() {
                stream_config = Some(concrete);
            }
            Some(format)
        })
        .collect();

    let format = select_exact(candidates).map_err(|e| {
        tracing::error!("Negotiation failed for '{}': {}", device_name, e);
        e
    })?;

    // stream_config is always set when select_exact succeeded
    let stream_config = stream_config.ok_or_else(|| {
        CaptureError::Backend("matched format lost its stream config".to_string())
    })?;

    tracing::debug!("Negotiated {} on '{}'", format, device_name);
    Ok(NegotiatedInput {
        device,
        stream_config,
        format,
    })
}

/// Maps a concrete cpal stream config onto a [`CaptureFormat`], or `None`
/// for sample formats the pipeline has no name for.
fn describe(config: &cpal::SupportedStreamConfig) -> Option<CaptureFormat> {
    let (bits, encoding) = match config.sample_format() {
        SampleFormat::I16 => (16, SampleEncoding::SignedInt),
        SampleFormat::U16 => (16, SampleEncoding::UnsignedInt),
        SampleFormat::I32 => (32, SampleEncoding::SignedInt),
        SampleFormat::U32 => (32, SampleEncoding::UnsignedInt),
        SampleFormat::F32 => (32, SampleEncoding::Float),
        SampleFormat::F64 => (64, SampleEncoding::Float),
        SampleFormat::I8 => (8, SampleEncoding::SignedInt),
        SampleFormat::U8 => (8, SampleEncoding::UnsignedInt),
        _ => return None,
    };

    // cpal delivers host-endian samples; the wire order follows the target.
    let byte_order = if cfg!(target_endian = "big") {
        ByteOrder::Big
    } else {
        ByteOrder::Little
    };

    Some(CaptureFormat {
        sample_rate_hz: config.sample_rate().0,
        channels: config.channels(),
        bits_per_sample: bits,
        byte_order,
        encoding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> CaptureFormat {
        CaptureFormat::TARGET
    }

    #[test]
    fn select_exact_accepts_target_format() {
        let supported = vec![
            CaptureFormat {
                channels: 2,
                ..target()
            },
            target(),
        ];
        let format = select_exact(supported).unwrap();
        assert_eq!(format, target());
    }

    #[test]
    fn select_exact_rejects_near_misses() {
        // Same device family, every field off by one knob: none may match.
        let supported = vec![
            CaptureFormat {
                sample_rate_hz: 48_000,
                ..target()
            },
            CaptureFormat {
                channels: 2,
                ..target()
            },
            CaptureFormat {
                encoding: SampleEncoding::Float,
                bits_per_sample: 32,
                ..target()
            },
            CaptureFormat {
                byte_order: ByteOrder::Big,
                ..target()
            },
        ];
        let err = select_exact(supported).unwrap_err();
        assert!(matches!(err, CaptureError::UnsupportedFormat(_)));
    }

    #[test]
    fn select_exact_rejects_empty_capability_set() {
        let err = select_exact(Vec::new()).unwrap_err();
        assert!(matches!(err, CaptureError::UnsupportedFormat(_)));
    }

    #[test]
    fn target_is_cd_rate_mono_s16le() {
        let t = target();
        assert_eq!(t.sample_rate_hz, 44_100);
        assert_eq!(t.channels, 1);
        assert_eq!(t.bytes_per_sample(), 2);
        assert_eq!(t.to_string(), "44100Hz/1ch/s16le");
    }
}
