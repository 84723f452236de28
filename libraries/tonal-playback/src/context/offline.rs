//! Offline audio context
//!
//! Renders on demand instead of following a device clock. Used by tests
//! and headless runs; `render_frames` plays the role of the audio callback.

use super::{AudioContext, ContextState};
use crate::error::ContextError;
use crate::render::SharedRenderer;
use std::sync::{Mutex, MutexGuard};

/// Block size used when rendering, in frames
const RENDER_QUANTUM: usize = 128;

struct OfflineInner {
    state: ContextState,
    renderer: Option<SharedRenderer>,
    refuse_start: Option<String>,
    rendered_frames: u64,
}

pub struct OfflineContext {
    sample_rate: u32,
    channels: u16,
    inner: Mutex<OfflineInner>,
}

impl OfflineContext {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels: channels.max(1),
            inner: Mutex::new(OfflineInner {
                state: ContextState::Suspended,
                renderer: None,
                refuse_start: None,
                rendered_frames: 0,
            }),
        }
    }

    /// Refuse every `resume()` with `reason` until `allow_start()`
    pub fn refusing_start(self, reason: impl Into<String>) -> Self {
        self.inner().refuse_start = Some(reason.into());
        self
    }

    pub fn allow_start(&self) {
        self.inner().refuse_start = None;
    }

    fn inner(&self) -> MutexGuard<'_, OfflineInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Pull `frames` frames from the renderer
    ///
    /// Returns interleaved output. A suspended or closed context, or one
    /// without a renderer, produces silence and does not advance.
    pub fn render_frames(&self, frames: usize) -> Vec<f32> {
        let channels = usize::from(self.channels);
        let mut output = vec![0.0; frames * channels];

        let renderer = {
            let inner = self.inner();
            if inner.state != ContextState::Running {
                return output;
            }
            match &inner.renderer {
                Some(renderer) => renderer.clone(),
                None => return output,
            }
        };

        for block in output.chunks_mut(RENDER_QUANTUM * channels) {
            match renderer.lock() {
                Ok(mut guard) => guard.render(block),
                Err(poisoned) => poisoned.into_inner().render(block),
            }
        }

        self.inner().rendered_frames += frames as u64;
        output
    }

    /// Pull `seconds` worth of frames (rounded to the nearest frame)
    pub fn render_seconds(&self, seconds: f64) -> Vec<f32> {
        let frames = (seconds * f64::from(self.sample_rate)).round() as usize;
        self.render_frames(frames)
    }

    /// Frames rendered while running
    pub fn rendered_frames(&self) -> u64 {
        self.inner().rendered_frames
    }
}

impl AudioContext for OfflineContext {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn state(&self) -> ContextState {
        self.inner().state
    }

    fn attach(&self, renderer: SharedRenderer) -> Result<(), ContextError> {
        let mut inner = self.inner();
        if inner.state == ContextState::Closed {
            return Err(ContextError::Closed);
        }
        inner.renderer = Some(renderer);
        Ok(())
    }

    fn resume(&self) -> Result<(), ContextError> {
        let mut inner = self.inner();
        match inner.state {
            ContextState::Closed => Err(ContextError::Closed),
            _ => {
                if let Some(reason) = &inner.refuse_start {
                    return Err(ContextError::StartRefused(reason.clone()));
                }
                inner.state = ContextState::Running;
                Ok(())
            }
        }
    }

    fn suspend(&self) -> Result<(), ContextError> {
        let mut inner = self.inner();
        if inner.state == ContextState::Closed {
            return Err(ContextError::Closed);
        }
        inner.state = ContextState::Suspended;
        Ok(())
    }

    fn close(&self) {
        let mut inner = self.inner();
        inner.state = ContextState::Closed;
        inner.renderer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Renderer, TransportStatus};

    #[test]
    fn suspended_context_renders_silence_without_advancing() {
        let context = OfflineContext::new(8_000, 2);
        context
            .attach(Renderer::new(8_000, 2, TransportStatus::new()).shared())
            .unwrap();

        let output = context.render_frames(256);
        assert_eq!(output.len(), 512);
        assert_eq!(context.rendered_frames(), 0);

        context.resume().unwrap();
        context.render_seconds(0.5);
        assert_eq!(context.rendered_frames(), 4_000);
    }

    #[test]
    fn refused_start_stays_suspended() {
        let context = OfflineContext::new(8_000, 1).refusing_start("no user gesture");

        assert_eq!(
            context.resume(),
            Err(ContextError::StartRefused("no user gesture".into()))
        );
        assert_eq!(context.state(), ContextState::Suspended);

        context.allow_start();
        assert!(context.resume().is_ok());
        assert_eq!(context.state(), ContextState::Running);
    }

    #[test]
    fn closed_context_cannot_resume() {
        let context = OfflineContext::new(8_000, 1);
        context.close();
        assert_eq!(context.resume(), Err(ContextError::Closed));
    }
}
