/// Audio-specific errors
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// Payload could not be decoded
    #[error(transparent)]
    Decode(#[from] tonal_core::DecodeError),

    /// Sample rate conversion failed
    #[error("Resampling error: {0}")]
    Resample(String),

    /// Invalid sample buffer
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),
}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(err: rubato::ResamplerConstructionError) -> Self {
        AudioError::Resample(err.to_string())
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(err: rubato::ResampleError) -> Self {
        AudioError::Resample(err.to_string())
    }
}
