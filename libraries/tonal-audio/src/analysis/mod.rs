//! Spectrum analysis for visualization
//!
//! `SpectrumTap` sits at the end of the signal path and copies the latest
//! time-domain samples into a `SpectrumSnapshot`. `SpectrumAnalyzer` turns a
//! snapshot into byte-scaled frequency magnitudes off the audio thread.

mod spectrum;
mod tap;

pub use spectrum::{SpectrumAnalyzer, BIN_COUNT, FFT_SIZE};
pub use tap::{SpectrumSnapshot, SpectrumTap};
