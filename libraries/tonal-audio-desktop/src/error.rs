/// Audio output errors
use thiserror::Error;
use tonal_playback::ContextError;

/// Result type for audio output operations
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio output errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AudioError {
    /// No default output device
    #[error("Audio device not found")]
    DeviceNotFound,

    /// Failed to query the device configuration
    #[error("Device error: {0}")]
    DeviceError(String),

    /// Failed to build output stream
    #[error("Failed to build output stream: {0}")]
    StreamBuildError(String),

    /// Failed to play stream
    #[error("Failed to play stream: {0}")]
    PlayError(String),

    /// Failed to pause stream
    #[error("Failed to pause stream: {0}")]
    PauseError(String),

    /// The audio thread is gone
    #[error("Audio thread stopped")]
    ThreadStopped,
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(err: cpal::BuildStreamError) -> Self {
        AudioError::StreamBuildError(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(err: cpal::PlayStreamError) -> Self {
        AudioError::PlayError(err.to_string())
    }
}

impl From<cpal::PauseStreamError> for AudioError {
    fn from(err: cpal::PauseStreamError) -> Self {
        AudioError::PauseError(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        AudioError::DeviceError(err.to_string())
    }
}

impl From<AudioError> for ContextError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::PlayError(reason) => ContextError::StartRefused(reason),
            AudioError::ThreadStopped => ContextError::Closed,
            other => ContextError::DeviceUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_failure_is_a_start_refusal() {
        let err: ContextError = AudioError::PlayError("device busy".into()).into();
        assert_eq!(err, ContextError::StartRefused("device busy".into()));
    }

    #[test]
    fn missing_device_is_unavailable() {
        let err: ContextError = AudioError::DeviceNotFound.into();
        assert_eq!(
            err,
            ContextError::DeviceUnavailable("Audio device not found".into())
        );
    }

    #[test]
    fn stopped_thread_is_closed() {
        let err: ContextError = AudioError::ThreadStopped.into();
        assert_eq!(err, ContextError::Closed);
    }
}
