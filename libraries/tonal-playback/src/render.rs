//! Render side of the engine
//!
//! The platform audio clock pulls blocks from a `Renderer` through its
//! `AudioContext`. Everything here must stay allocation-free per block.

use crate::graph::SignalPath;
use crate::source::BufferSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

/// Renderer shared between the control thread and the audio callback
pub type SharedRenderer = Arc<Mutex<Renderer>>;

/// Lock the renderer from the control side, recovering from poisoning
pub(crate) fn lock(renderer: &SharedRenderer) -> MutexGuard<'_, Renderer> {
    match renderer.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug, Default)]
struct StatusInner {
    /// Generation of the play request currently delivering samples (0 = none)
    active: AtomicU64,
    /// Generation of the most recent voice that ran to completion
    ended: AtomicU64,
    /// Generation of the most recent request that never got its samples
    failed: AtomicU64,
    notify: Notify,
}

/// Transport status published by the render side
///
/// Play requests are numbered; the renderer records which one reached its
/// end so stale completions can never affect a newer request.
#[derive(Debug, Clone, Default)]
pub struct TransportStatus {
    inner: Arc<StatusInner>,
}

impl TransportStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `generation` as the active play request
    pub fn begin(&self, generation: u64) {
        self.inner.active.store(generation, Ordering::Release);
    }

    /// No play request is active
    pub fn clear(&self) {
        self.inner.active.store(0, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// Called by the render side when a voice delivered its last frame
    pub fn mark_ended(&self, generation: u64) {
        self.inner.ended.store(generation, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// Called when a play request could not produce its voice
    pub fn mark_failed(&self, generation: u64) {
        self.inner.failed.store(generation, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    pub fn active_generation(&self) -> u64 {
        self.inner.active.load(Ordering::Acquire)
    }

    pub fn has_ended(&self, generation: u64) -> bool {
        generation != 0 && self.inner.ended.load(Ordering::Acquire) == generation
    }

    pub fn has_failed(&self, generation: u64) -> bool {
        generation != 0 && self.inner.failed.load(Ordering::Acquire) == generation
    }

    /// Whether `generation` is active and has neither ended nor failed
    pub fn is_playing(&self, generation: u64) -> bool {
        generation != 0
            && self.active_generation() == generation
            && !self.has_ended(generation)
            && !self.has_failed(generation)
    }

    /// Wait until `generation` stops playing
    ///
    /// Returns true when it reached its end, false otherwise.
    pub async fn wait_ended(&self, generation: u64) -> bool {
        loop {
            let notified = self.inner.notify.notified();
            if self.has_ended(generation) {
                return true;
            }
            if self.active_generation() != generation || self.has_failed(generation) {
                return false;
            }
            notified.await;
        }
    }
}

/// Real-time renderer: one optional voice feeding one optional signal path
pub struct Renderer {
    sample_rate: u32,
    channels: u16,
    path: Option<SignalPath>,
    voice: Option<BufferSource>,
    status: TransportStatus,
}

impl Renderer {
    pub fn new(sample_rate: u32, channels: u16, status: TransportStatus) -> Self {
        Self {
            sample_rate,
            channels: channels.max(1),
            path: None,
            voice: None,
            status,
        }
    }

    pub fn shared(self) -> SharedRenderer {
        Arc::new(Mutex::new(self))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Adopt the output format of a context; drops any connected path
    pub fn set_format(&mut self, sample_rate: u32, channels: u16) {
        if self.sample_rate != sample_rate || self.channels != channels {
            self.path = None;
        }
        self.sample_rate = sample_rate;
        self.channels = channels.max(1);
    }

    /// Render one interleaved block
    ///
    /// Writes silence when no path is connected.
    pub fn render(&mut self, output: &mut [f32]) {
        output.fill(0.0);

        let Some(path) = self.path.as_mut() else {
            return;
        };

        if let Some(voice) = self.voice.as_mut() {
            voice.read(output);
            if voice.is_finished() {
                let generation = voice.generation();
                self.voice = None;
                self.status.mark_ended(generation);
            }
        }

        path.process(output, self.sample_rate);
    }

    pub fn is_connected(&self) -> bool {
        self.path.is_some()
    }

    pub(crate) fn connect_path(&mut self, path: SignalPath) {
        self.path = Some(path);
    }

    /// Drop the signal path and any voice feeding it
    pub(crate) fn disconnect_path(&mut self) {
        self.voice = None;
        self.path = None;
    }

    pub fn stage_names(&self) -> Vec<String> {
        self.path
            .as_ref()
            .map(|p| p.stage_names().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Start a voice from offset 0, replacing any current one
    pub(crate) fn start_voice(&mut self, voice: BufferSource) {
        if let Some(path) = self.path.as_mut() {
            path.reset();
        }
        self.voice = Some(voice);
    }

    /// Remove the current voice and flush filter memory; returns its generation
    ///
    /// The path stays connected.
    pub(crate) fn stop_voice(&mut self) -> Option<u64> {
        if let Some(path) = self.path.as_mut() {
            path.reset();
        }
        self.voice.take().map(|v| v.generation())
    }

    pub fn has_voice(&self) -> bool {
        self.voice.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphParams;
    use tonal_audio::SpectrumSnapshot;
    use tonal_core::EqualizerSettings;

    fn connected_renderer(status: TransportStatus) -> Renderer {
        let mut renderer = Renderer::new(8_000, 2, status);
        let params = GraphParams::new(EqualizerSettings::flat(), 1.0);
        renderer.connect_path(SignalPath::new(&params, SpectrumSnapshot::new(), 2));
        renderer
    }

    #[test]
    fn disconnected_renderer_is_silent() {
        let mut renderer = Renderer::new(8_000, 2, TransportStatus::new());
        renderer.start_voice(BufferSource::new(vec![1.0; 8].into(), 1, 2, 1));

        let mut block = vec![0.7; 8];
        renderer.render(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn voice_end_is_published_once_delivered() {
        let status = TransportStatus::new();
        let mut renderer = connected_renderer(status.clone());
        status.begin(3);
        renderer.start_voice(BufferSource::new(vec![0.5; 6].into(), 1, 2, 3));

        let mut block = vec![0.0; 8];
        renderer.render(&mut block);
        assert!(status.is_playing(3));

        renderer.render(&mut block);
        assert!(status.has_ended(3));
        assert!(!status.is_playing(3));
        assert!(!renderer.has_voice());
    }

    #[test]
    fn stopped_voice_leaves_no_filter_tail() {
        let status = TransportStatus::new();
        let mut renderer = Renderer::new(8_000, 2, status.clone());
        let params = GraphParams::new(EqualizerSettings::new(12, 12, 12), 1.0);
        renderer.connect_path(SignalPath::new(&params, SpectrumSnapshot::new(), 2));

        status.begin(1);
        let tone: Vec<f32> = (0..800).map(|i| (i as f32 * 0.3).sin() * 0.5).collect();
        renderer.start_voice(BufferSource::new(tone.into(), 1, 2, 1));
        let mut block = vec![0.0; 256];
        renderer.render(&mut block);
        assert!(block.iter().any(|&s| s != 0.0));

        assert_eq!(renderer.stop_voice(), Some(1));
        assert!(renderer.is_connected());
        for _ in 0..4 {
            renderer.render(&mut block);
            assert!(block.iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn stale_generation_does_not_look_active() {
        let status = TransportStatus::new();
        status.begin(1);
        status.mark_ended(1);
        status.begin(2);

        assert!(status.is_playing(2));
        assert!(!status.has_ended(2));
    }

    #[test]
    fn format_change_drops_path() {
        let mut renderer = connected_renderer(TransportStatus::new());
        renderer.set_format(8_000, 2);
        assert!(renderer.is_connected());

        renderer.set_format(48_000, 2);
        assert!(!renderer.is_connected());
    }

    #[test]
    fn failed_request_is_not_playing() {
        let status = TransportStatus::new();
        status.begin(4);
        status.mark_failed(4);

        assert!(status.has_failed(4));
        assert!(!status.is_playing(4));
        assert!(!status.has_ended(4));
    }

    #[tokio::test]
    async fn wait_ended_distinguishes_stop_from_completion() {
        let status = TransportStatus::new();
        status.begin(5);
        let waiter = {
            let status = status.clone();
            tokio::spawn(async move { status.wait_ended(5).await })
        };
        tokio::task::yield_now().await;
        status.mark_ended(5);
        assert!(waiter.await.unwrap());

        status.begin(6);
        let waiter = {
            let status = status.clone();
            tokio::spawn(async move { status.wait_ended(6).await })
        };
        tokio::task::yield_now().await;
        status.clear();
        assert!(!waiter.await.unwrap());
    }
}
