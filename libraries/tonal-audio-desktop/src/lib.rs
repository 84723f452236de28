//! Desktop audio output using CPAL
//!
//! Provides `CpalContext`, an `AudioContext` backed by the default output
//! device, and `engine()`, a lazily initialised engine context over it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tonal_audio::SymphoniaDecoder;
//! use tonal_playback::{PlaybackConfig, PlaybackController};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Arc::new(tonal_audio_desktop::engine());
//! let mut controller = PlaybackController::new(
//!     PlaybackConfig::default(),
//!     Arc::new(SymphoniaDecoder::new()),
//!     engine,
//! );
//!
//! let payload = std::fs::read("song.mp3")?;
//! let pending = controller.begin_load(payload)?;
//! # let _ = pending;
//! # Ok(())
//! # }
//! ```

mod error;
mod output;

pub use error::{AudioError, Result};
pub use output::{engine, CpalContext};
