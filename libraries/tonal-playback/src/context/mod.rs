//! Audio engine context
//!
//! An `AudioContext` is the platform output: it owns the audio clock and
//! pulls blocks from the attached `Renderer`. `EngineContext` wraps the
//! process-wide context with an explicit lifecycle: created lazily on first
//! use, exactly once, and unusable after `release()`.

mod offline;

pub use offline::OfflineContext;

use crate::error::{ContextError, PlaybackError};
use crate::render::SharedRenderer;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info};

/// Lifecycle of an audio context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextState {
    /// Created but not pulling audio
    Suspended,
    /// Pulling audio from the renderer
    Running,
    /// Closed; cannot be resumed
    Closed,
}

/// Platform audio output
///
/// Implementations call `Renderer::render` from their audio clock. They must
/// not block that clock on the renderer lock (use `try_lock`).
pub trait AudioContext: Send + Sync {
    /// Output sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Output channel count
    fn channels(&self) -> u16;

    fn state(&self) -> ContextState;

    /// Attach the renderer that feeds this output
    fn attach(&self, renderer: SharedRenderer) -> Result<(), ContextError>;

    /// Start or resume pulling audio
    fn resume(&self) -> Result<(), ContextError>;

    /// Stop pulling audio without closing
    fn suspend(&self) -> Result<(), ContextError>;

    /// Close the context and release the device
    fn close(&self);
}

/// Creates the platform context on first use
pub type ContextFactory =
    Box<dyn FnOnce() -> Result<Arc<dyn AudioContext>, ContextError> + Send>;

enum Slot {
    Pending(ContextFactory),
    Active(Arc<dyn AudioContext>),
    Failed(ContextError),
    Released,
}

/// Explicit owner of the process-wide audio context
pub struct EngineContext {
    slot: Mutex<Slot>,
}

impl EngineContext {
    /// Defer context creation until the first `acquire()`
    pub fn lazy<F>(factory: F) -> Self
    where
        F: FnOnce() -> Result<Arc<dyn AudioContext>, ContextError> + Send + 'static,
    {
        Self {
            slot: Mutex::new(Slot::Pending(Box::new(factory))),
        }
    }

    /// Wrap an already created context
    pub fn from_context(context: Arc<dyn AudioContext>) -> Self {
        Self {
            slot: Mutex::new(Slot::Active(context)),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Get the context, creating it on first call
    ///
    /// # Errors
    /// `EngineReleased` after `release()`; the construction error (cached)
    /// when the platform context could not be created
    pub fn acquire(&self) -> Result<Arc<dyn AudioContext>, PlaybackError> {
        let mut slot = self.slot();
        match &*slot {
            Slot::Active(context) => return Ok(Arc::clone(context)),
            Slot::Failed(err) => return Err(PlaybackError::Context(err.clone())),
            Slot::Released => {
                error!("Audio engine used after release");
                return Err(PlaybackError::EngineReleased);
            }
            Slot::Pending(_) => {}
        }

        let Slot::Pending(factory) = std::mem::replace(&mut *slot, Slot::Released) else {
            return Err(PlaybackError::EngineReleased);
        };

        match factory() {
            Ok(context) => {
                info!(
                    "Audio context created ({} Hz, {} channels)",
                    context.sample_rate(),
                    context.channels()
                );
                *slot = Slot::Active(Arc::clone(&context));
                Ok(context)
            }
            Err(err) => {
                error!("Audio context creation failed: {}", err);
                *slot = Slot::Failed(err.clone());
                Err(PlaybackError::Context(err))
            }
        }
    }

    /// Rate of the created context; never creates one
    pub fn sample_rate(&self) -> Option<u32> {
        match &*self.slot() {
            Slot::Active(context) => Some(context.sample_rate()),
            _ => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(&*self.slot(), Slot::Active(_))
    }

    pub fn is_released(&self) -> bool {
        matches!(&*self.slot(), Slot::Released)
    }

    /// Close the context; every later `acquire()` fails
    pub fn release(&self) {
        let previous = std::mem::replace(&mut *self.slot(), Slot::Released);
        if let Slot::Active(context) = previous {
            context.close();
            info!("Audio context released");
        }
    }
}
