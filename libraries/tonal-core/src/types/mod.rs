/// Domain types for Tonal
mod asset;
mod equalizer;
mod visualizer;

pub use asset::{AssetInfo, AudioAsset, MAX_CHANNELS};
pub use equalizer::{Band, EqualizerSettings, GAIN_LIMIT_DB};
pub use visualizer::{VisualizerFrame, FRAME_BINS};
