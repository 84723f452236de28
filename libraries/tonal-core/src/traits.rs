/// Core traits for Tonal
use crate::error::DecodeError;
use crate::types::AudioAsset;

/// Audio decoder trait
///
/// Implementers turn an opaque encoded payload into a fully decoded
/// `AudioAsset`. Decoding may take a long time, so callers run it off the
/// control thread.
pub trait AudioDecoder: Send + Sync {
    /// Decode the whole payload into memory
    ///
    /// # Errors
    /// Returns an error if the payload is empty, unrecognised, or holds no
    /// supported audio stream
    fn decode(&self, payload: &[u8]) -> Result<AudioAsset, DecodeError>;
}
