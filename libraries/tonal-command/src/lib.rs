//! Tonal Command
//!
//! Turns free-text utterances ("boost bass", "rock preset") into equalizer
//! settings. Matching is case-insensitive substring containment; presets
//! win over per-band adjustments.
//!
//! ```rust
//! use tonal_command::interpret;
//! use tonal_core::EqualizerSettings;
//!
//! assert_eq!(interpret("Boost the BASS"), Some(EqualizerSettings::new(10, 0, 0)));
//! assert_eq!(interpret("boost bass rock"), Some(EqualizerSettings::new(6, -2, 8)));
//! assert_eq!(interpret("banana"), None);
//! ```

mod interpreter;
mod response;

pub use interpreter::{interpret, CommandInterpreter, Preset, PRESETS};
pub use response::{guidance, reply, respond, Response};
