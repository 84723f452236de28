/// Decoded audio assets
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of interleaved channels an asset may carry
pub const MAX_CHANNELS: u16 = 8;

/// Immutable decoded sample buffer
///
/// Samples are interleaved f32 in [-1.0, 1.0]. The buffer is shared, so
/// cloning an asset never copies audio data.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAsset {
    samples: Arc<[f32]>,
    sample_rate: u32,
    channels: u16,
}

impl AudioAsset {
    /// Create an asset from interleaved samples
    ///
    /// # Errors
    /// Returns an error if the sample rate is zero, the channel count is
    /// outside `1..=MAX_CHANNELS`, or the buffer does not hold whole frames
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate: u32, channels: u16) -> Result<Self> {
        let samples = samples.into();

        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate(sample_rate));
        }
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(CoreError::InvalidChannelCount(channels));
        }
        if samples.is_empty() {
            return Err(CoreError::Empty);
        }
        if samples.len() % channels as usize != 0 {
            return Err(CoreError::PartialFrame {
                samples: samples.len(),
                channels,
            });
        }

        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Shared handle to the sample buffer
    pub fn shared_samples(&self) -> Arc<[f32]> {
        Arc::clone(&self.samples)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs())
    }

    /// Metadata reported to the embedding application
    pub fn info(&self) -> AssetInfo {
        AssetInfo {
            duration_seconds: self.duration_secs(),
            sample_rate: self.sample_rate,
            channel_count: self.channels,
        }
    }
}

/// Metadata of a decoded asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channel_count: u16,
}

impl fmt::Display for AssetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}s, {} channel(s)",
            self.duration_seconds, self.channel_count
        )
    }
}
