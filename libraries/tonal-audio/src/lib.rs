//! Tonal Audio
//!
//! Signal processing building blocks for the Tonal engine:
//! - `SymphoniaDecoder`: payload bytes to `AudioAsset`
//! - `FilterNode`, `GainStage`: equalizer stages behind the `AudioEffect` trait
//! - `SpectrumAnalyzer`, `SpectrumTap`: frequency data for the visualizer
//! - `resample_interleaved`: sample rate conversion with rubato

pub mod analysis;
pub mod decoder;
pub mod effects;
pub mod error;
pub mod resampling;

pub use analysis::{SpectrumAnalyzer, SpectrumSnapshot, SpectrumTap, BIN_COUNT, FFT_SIZE};
pub use decoder::SymphoniaDecoder;
pub use effects::{AudioEffect, EffectChain, FilterKind, FilterNode, FilterSpec, GainStage, SharedParam};
pub use error::{AudioError, Result};
pub use resampling::resample_interleaved;
