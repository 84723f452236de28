/// Audio decoder implementation using Symphonia
use std::io::Cursor;
use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tonal_core::{AudioAsset, AudioDecoder, DecodeError};
use tracing::{debug, warn};

/// Audio decoder using Symphonia
///
/// Supports: MP3, FLAC, OGG/Vorbis, WAV, AAC/M4A
///
/// The whole payload is decoded into memory. Channel layout and sample
/// rate are preserved; samples are converted to interleaved f32.
#[derive(Debug, Clone, Default)]
pub struct SymphoniaDecoder {
    /// Optional file extension used as a probe hint
    extension: Option<String>,
}

impl SymphoniaDecoder {
    /// Create a new decoder that probes the payload without hints
    pub fn new() -> Self {
        Self { extension: None }
    }

    /// Create a decoder that hints the container by file extension
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: Some(extension.into()),
        }
    }

    fn hint(&self) -> Hint {
        let mut hint = Hint::new();
        if let Some(ext) = &self.extension {
            hint.with_extension(ext);
        }
        hint
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, payload: &[u8]) -> Result<AudioAsset, DecodeError> {
        if payload.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }

        let mss = MediaSourceStream::new(Box::new(Cursor::new(payload.to_vec())), Default::default());

        // Probe the media source
        let probed = symphonia::default::get_probe()
            .format(
                &self.hint(),
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecodeError::malformed(format!("failed to probe payload: {}", e)))?;

        let mut format = probed.format;

        // First track with a real codec
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DecodeError::unsupported("no audio track found"))?;

        let track_id = track.id;
        let track_rate = track.codec_params.sample_rate;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError::unsupported(format!("failed to create decoder: {}", e)))?;

        let mut spec: Option<SignalSpec> = None;
        let mut sample_buf: Option<SampleBuffer<f32>> = None;
        let mut all_samples = Vec::new();
        let mut skipped_packets = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) if !all_samples.is_empty() => {
                    // Truncated stream: keep what was decoded so far
                    warn!("Stopping decode after read error: {}", e);
                    break;
                }
                Err(e) => {
                    return Err(DecodeError::malformed(format!("error reading packet: {}", e)));
                }
            };

            // Skip packets that are not for the selected track
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    debug!("Skipping undecodable packet: {}", e);
                    skipped_packets += 1;
                    continue;
                }
                Err(SymphoniaError::IoError(e)) => {
                    debug!("Skipping packet after I/O error: {}", e);
                    skipped_packets += 1;
                    continue;
                }
                Err(e) => {
                    return Err(DecodeError::unsupported(format!("decode error: {}", e)));
                }
            };

            let packet_spec = *decoded.spec();
            if decoded.frames() == 0 {
                continue;
            }

            let needs_buffer = sample_buf
                .as_ref()
                .map_or(true, |buf| buf.capacity() < decoded.capacity() * packet_spec.channels.count());
            if needs_buffer {
                sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, packet_spec));
            }
            spec.get_or_insert(packet_spec);

            if let Some(buf) = sample_buf.as_mut() {
                buf.copy_interleaved_ref(decoded);
                all_samples.extend_from_slice(buf.samples());
            }
        }

        let spec = spec.ok_or_else(|| DecodeError::malformed("no audio frames"))?;
        let channels = spec.channels.count() as u16;
        let sample_rate = track_rate.unwrap_or(spec.rate);

        debug!(
            "Decoded {} samples ({} Hz, {} channels, {} packets skipped)",
            all_samples.len(),
            sample_rate,
            channels,
            skipped_packets
        );

        Ok(AudioAsset::new(all_samples, sample_rate, channels)?)
    }
}
