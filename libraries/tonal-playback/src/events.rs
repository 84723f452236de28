//! Playback Events
//!
//! Queued by the controller and drained by the embedding application.

use crate::types::PlaybackState;
use serde::{Deserialize, Serialize};
use tonal_core::{AssetInfo, EqualizerSettings};

/// Events emitted by the playback system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// A decoded asset replaced the previous one
    AssetLoaded { info: AssetInfo },

    /// Transport state changed
    StateChanged { state: PlaybackState },

    /// Equalizer gains were applied
    EqualizerChanged { settings: EqualizerSettings },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0-100)
        level: u8,
    },

    /// Playback reached the end of the asset
    Ended,

    /// Recoverable error reported to the user
    Error { message: String },
}
