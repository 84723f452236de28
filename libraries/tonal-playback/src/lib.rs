//! Tonal Playback
//!
//! Platform-agnostic playback engine: a fixed equalizer graph, a transport
//! state machine, and visualizer sampling.
//!
//! # Architecture
//!
//! - **Control side** (`PlaybackController`, `FilterGraph`): owned by one
//!   control thread; every mutation happens there
//! - **Render side** (`Renderer`): pulled by the platform's audio clock
//!   through an `AudioContext`; reads gains through lock-free parameters
//! - **Visualizer** (`VisualizerFrames`): timer-driven stream reading the
//!   latest spectrum snapshot
//!
//! Platform crates supply an `AudioContext` (e.g. cpal on desktop).
//! `OfflineContext` renders on demand for tests and headless use.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tonal_core::{AudioAsset, EqualizerSettings};
//! use tonal_playback::{PlaybackConfig, PlaybackController, PlaybackState, OfflineContext};
//! use tonal_audio::SymphoniaDecoder;
//!
//! let context = Arc::new(OfflineContext::new(44_100, 2));
//! let mut controller = PlaybackController::with_context(
//!     PlaybackConfig::default(),
//!     Arc::new(SymphoniaDecoder::new()),
//!     context.clone(),
//! );
//!
//! let asset = AudioAsset::new(vec![0.0; 44_100], 44_100, 1).unwrap();
//! controller.set_asset(asset).unwrap();
//! controller.set_equalizer(EqualizerSettings::new(6, -2, 8));
//! controller.play().unwrap();
//! assert_eq!(controller.state(), PlaybackState::Playing);
//!
//! context.render_seconds(1.0);
//! assert_eq!(controller.state(), PlaybackState::Ended);
//! ```

pub mod context;
pub mod controller;
pub mod error;
pub mod events;
pub mod graph;
mod prepare;
pub mod render;
pub mod source;
pub mod types;
pub mod visualizer;
pub mod volume;

pub use context::{AudioContext, ContextFactory, ContextState, EngineContext, OfflineContext};
pub use controller::{DecodedLoad, PendingLoad, PlaybackController};
pub use error::{ContextError, PlaybackError, Result};
pub use events::PlaybackEvent;
pub use graph::{FilterGraph, GraphParams};
pub use render::{Renderer, SharedRenderer, TransportStatus};
pub use source::BufferSource;
pub use types::{PlaybackConfig, PlaybackState};
pub use visualizer::{frame_from_spectrum, VisualizerFrames};
pub use volume::Volume;
