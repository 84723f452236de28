//! Error types for playback

use thiserror::Error;
use tonal_core::DecodeError;

/// Errors raised by an audio context (the platform output)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    /// No usable output device
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Output refused to start (e.g. autoplay policy, device busy)
    #[error("Audio output refused to start: {0}")]
    StartRefused(String),

    /// Context was closed
    #[error("Audio context is closed")]
    Closed,
}

/// Playback errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaybackError {
    /// Play requested before any asset was decoded
    #[error("No audio loaded")]
    NoAssetLoaded,

    /// Play requested while a playback instance is active
    #[error("Already playing")]
    AlreadyPlaying,

    /// Play requested while a decode is pending
    #[error("Audio is still loading")]
    Loading,

    /// A newer load replaced this one before it finished
    #[error("Load superseded by a newer request")]
    Superseded,

    /// The output refused to start
    #[error("Playback could not start: {0}")]
    PlaybackStart(String),

    /// The engine context was released
    #[error("Audio engine has been released")]
    EngineReleased,

    /// Payload could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Context failure outside of starting playback
    #[error(transparent)]
    Context(ContextError),
}

impl From<ContextError> for PlaybackError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Closed => PlaybackError::EngineReleased,
            ContextError::StartRefused(reason) => PlaybackError::PlaybackStart(reason),
            other => PlaybackError::Context(other),
        }
    }
}

impl PlaybackError {
    /// Whether normal control flow can continue after this error
    ///
    /// Use after release is a programming error, and a platform context
    /// that could not be created stays unavailable for the whole session.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PlaybackError::EngineReleased | PlaybackError::Context(_))
    }

    /// Human-readable message with guidance for the user
    pub fn user_message(&self) -> String {
        match self {
            PlaybackError::NoAssetLoaded => "Load an audio file before pressing play.".to_string(),
            PlaybackError::AlreadyPlaying => "Playback is already running.".to_string(),
            PlaybackError::Loading => "Still decoding, try again in a moment.".to_string(),
            PlaybackError::Superseded => "A newer file replaced this one.".to_string(),
            PlaybackError::PlaybackStart(reason) => {
                format!("Audio output did not start ({}). Interact and try again.", reason)
            }
            PlaybackError::EngineReleased => "The audio engine is shut down.".to_string(),
            PlaybackError::Decode(err) => format!("Could not read this file: {}", err),
            PlaybackError::Context(err) => format!("Audio output problem: {}", err),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
