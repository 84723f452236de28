//! Equalizer stages
//!
//! Every stage implements `AudioEffect` and processes interleaved f32
//! samples in place. `EffectChain` runs stages in insertion order.

mod chain;
mod filter;
mod gain;
mod param;

pub use chain::{AudioEffect, EffectChain};
pub use filter::{FilterKind, FilterNode, FilterSpec};
pub use gain::GainStage;
pub use param::SharedParam;
