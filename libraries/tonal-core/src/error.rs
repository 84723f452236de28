/// Core error types for Tonal
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while building core values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Sample rate of zero
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    /// Channel count outside 1..=MAX_CHANNELS
    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(u16),

    /// Sample buffer that does not hold whole frames
    #[error("Sample count {samples} is not a multiple of {channels} channels")]
    PartialFrame { samples: usize, channels: u16 },

    /// Sample buffer without a single frame
    #[error("Audio asset contains no samples")]
    Empty,
}

/// Failure to turn a binary payload into an `AudioAsset`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Zero-length payload
    #[error("Audio payload is empty")]
    EmptyPayload,

    /// Container could not be recognised or its header is corrupt
    #[error("Malformed audio header: {0}")]
    MalformedHeader(String),

    /// Container was recognised but holds no supported audio stream
    #[error("Unsupported audio encoding: {0}")]
    UnsupportedEncoding(String),

    /// Decoder ran but produced an unusable asset
    #[error("Invalid decoded audio: {0}")]
    InvalidAsset(#[from] CoreError),

    /// Decode task ended without a result
    #[error("Decode task failed: {0}")]
    Interrupted(String),
}

impl DecodeError {
    /// Create a malformed header error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedHeader(msg.into())
    }

    /// Create an unsupported encoding error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedEncoding(msg.into())
    }
}
