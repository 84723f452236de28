//! Core types for playback

use serde::{Deserialize, Serialize};
use tonal_core::EqualizerSettings;

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// No asset loaded
    Idle,

    /// Asset decoded, nothing playing
    Ready,

    /// A source is delivering samples
    Playing,

    /// The source played to completion; behaves like `Ready`
    Ended,
}

impl PlaybackState {
    /// Whether `play()` may start from this state
    pub fn can_play(&self) -> bool {
        matches!(self, PlaybackState::Ready | PlaybackState::Ended)
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial volume (0-100, default: 70)
    pub volume: u8,

    /// Initial equalizer (default: flat)
    pub equalizer: EqualizerSettings,

    /// Visualizer cadence in milliseconds (default: 50)
    pub frame_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 70,
            equalizer: EqualizerSettings::flat(),
            frame_interval_ms: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.volume, 70);
        assert!(config.equalizer.is_flat());
        assert_eq!(config.frame_interval_ms, 50);
    }

    #[test]
    fn only_resting_states_can_play() {
        assert!(!PlaybackState::Idle.can_play());
        assert!(PlaybackState::Ready.can_play());
        assert!(!PlaybackState::Playing.can_play());
        assert!(PlaybackState::Ended.can_play());
    }
}
