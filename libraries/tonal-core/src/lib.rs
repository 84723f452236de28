//! Tonal Core
//!
//! Platform-agnostic data model, traits, and error types shared by every
//! Tonal crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `AudioAsset`, `EqualizerSettings`, `VisualizerFrame`
//! - **Core Traits**: `AudioDecoder`
//! - **Error Handling**: `DecodeError` and `CoreError`
//!
//! # Example
//!
//! ```rust
//! use tonal_core::{Band, EqualizerSettings};
//!
//! let settings = EqualizerSettings::new(20, -3, 4);
//! assert_eq!(settings.bass(), 12);
//! assert_eq!(settings.with(Band::Mid, 0).mid(), 0);
//! assert_eq!(settings.reset(), EqualizerSettings::flat());
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CoreError, DecodeError, Result};
pub use traits::AudioDecoder;
pub use types::{
    AssetInfo, AudioAsset, Band, EqualizerSettings, VisualizerFrame, FRAME_BINS, GAIN_LIMIT_DB,
    MAX_CHANNELS,
};
