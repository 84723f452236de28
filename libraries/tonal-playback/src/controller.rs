//! Playback controller
//!
//! Owns the transport state machine and is the only place where the signal
//! path is connected, torn down, or fed. Every method runs on the control
//! thread; the render side only reports completion through
//! `TransportStatus`.

use crate::context::{AudioContext, ContextState, EngineContext};
use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::graph::FilterGraph;
use crate::prepare::{ConversionCache, Prepared, VoiceJob};
use crate::render::{self, Renderer, SharedRenderer, TransportStatus};
use crate::source::BufferSource;
use crate::types::{PlaybackConfig, PlaybackState};
use crate::visualizer::VisualizerFrames;
use crate::volume::Volume;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::task::JoinHandle;
use tonal_core::{AssetInfo, AudioAsset, AudioDecoder, DecodeError, EqualizerSettings};
use tracing::{debug, error, info, warn};

/// Format the renderer assumes before a context is attached
const PLACEHOLDER_RATE: u32 = 44_100;
const PLACEHOLDER_CHANNELS: u16 = 2;

/// Outcome of a background decode, tagged with its load request
#[derive(Debug)]
pub struct DecodedLoad {
    generation: u64,
    result: std::result::Result<Prepared, DecodeError>,
}

impl DecodedLoad {
    /// Load request this result belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

enum PendingInner {
    Ready(Option<DecodedLoad>),
    Blocking {
        generation: u64,
        handle: JoinHandle<std::result::Result<Prepared, DecodeError>>,
    },
}

/// Decode in flight; resolves to a `DecodedLoad`
///
/// Hand the result back to `PlaybackController::apply_load`.
pub struct PendingLoad {
    inner: PendingInner,
}

impl PendingLoad {
    pub fn generation(&self) -> u64 {
        match &self.inner {
            PendingInner::Ready(Some(load)) => load.generation,
            PendingInner::Ready(None) => 0,
            PendingInner::Blocking { generation, .. } => *generation,
        }
    }
}

impl Future for PendingLoad {
    type Output = DecodedLoad;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.inner {
            PendingInner::Ready(load) => match load.take() {
                Some(load) => Poll::Ready(load),
                None => Poll::Ready(DecodedLoad {
                    generation: 0,
                    result: Err(DecodeError::Interrupted("load polled after completion".into())),
                }),
            },
            PendingInner::Blocking { generation, handle } => {
                let generation = *generation;
                Pin::new(handle).poll(cx).map(|joined| DecodedLoad {
                    generation,
                    result: joined.unwrap_or_else(|e| Err(DecodeError::Interrupted(e.to_string()))),
                })
            }
        }
    }
}

/// Playback controller
///
/// Created once per session. Loads replace the current asset; `play()`
/// starts one playback instance at a time from offset 0.
pub struct PlaybackController {
    config: PlaybackConfig,
    decoder: Arc<dyn AudioDecoder>,
    engine: Arc<EngineContext>,
    attached: bool,
    renderer: SharedRenderer,
    graph: FilterGraph,
    status: TransportStatus,
    state: PlaybackState,
    asset: Option<AudioAsset>,
    /// Load request that installed the current asset
    asset_id: u64,
    conversions: ConversionCache,
    /// Background conversion started by `play()`
    conversion: Option<JoinHandle<()>>,
    load_generation: u64,
    pending_load: Option<u64>,
    play_generation: u64,
    events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    /// Create a controller over a (possibly lazy) engine context
    ///
    /// Nothing touches the audio device until the first `play()`.
    pub fn new(
        config: PlaybackConfig,
        decoder: Arc<dyn AudioDecoder>,
        engine: Arc<EngineContext>,
    ) -> Self {
        let status = TransportStatus::new();
        let renderer =
            Renderer::new(PLACEHOLDER_RATE, PLACEHOLDER_CHANNELS, status.clone()).shared();
        let graph = FilterGraph::new(
            Arc::clone(&renderer),
            config.equalizer,
            Volume::new(config.volume),
        );

        Self {
            config,
            decoder,
            engine,
            attached: false,
            renderer,
            graph,
            status,
            state: PlaybackState::Idle,
            asset: None,
            asset_id: 0,
            conversions: ConversionCache::default(),
            conversion: None,
            load_generation: 0,
            pending_load: None,
            play_generation: 0,
            events: Vec::new(),
        }
    }

    /// Create a controller over an existing context
    pub fn with_context(
        config: PlaybackConfig,
        decoder: Arc<dyn AudioDecoder>,
        context: Arc<dyn AudioContext>,
    ) -> Self {
        Self::new(config, decoder, Arc::new(EngineContext::from_context(context)))
    }

    // ===== Queries =====

    /// Current transport state
    ///
    /// Reports `Ended` as soon as the render side delivered the last frame.
    pub fn state(&self) -> PlaybackState {
        if self.state != PlaybackState::Playing {
            self.state
        } else if self.status.has_ended(self.play_generation) {
            PlaybackState::Ended
        } else if self.status.has_failed(self.play_generation) {
            PlaybackState::Ready
        } else {
            PlaybackState::Playing
        }
    }

    pub fn asset(&self) -> Option<&AudioAsset> {
        self.asset.as_ref()
    }

    pub fn asset_info(&self) -> Option<AssetInfo> {
        self.asset.as_ref().map(AudioAsset::info)
    }

    /// Whether a decode started by `begin_load` has not been applied yet
    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Whether `play()` handed a sample rate conversion to the blocking pool
    /// that has not finished yet
    pub fn is_preparing(&self) -> bool {
        self.conversion.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn graph(&self) -> &FilterGraph {
        &self.graph
    }

    pub fn equalizer(&self) -> EqualizerSettings {
        self.graph.settings()
    }

    pub fn volume(&self) -> u8 {
        self.graph.volume()
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<EngineContext> {
        &self.engine
    }

    // ===== Loading =====

    /// Replace the current asset with an already decoded one
    ///
    /// Stops any playback, supersedes pending loads, and moves to `Ready`.
    pub fn set_asset(&mut self, asset: AudioAsset) -> Result<AssetInfo> {
        self.ensure_not_released()?;
        self.load_generation += 1;
        self.pending_load = None;
        let id = self.load_generation;
        Ok(self.install(Prepared::new(asset, None), id))
    }

    /// Start decoding `payload` in the background
    ///
    /// When the engine context already exists the decoded samples are also
    /// converted to its rate. A later `begin_load` or `set_asset` supersedes
    /// this one. Playback already running continues until the result is
    /// applied.
    pub fn begin_load(&mut self, payload: Vec<u8>) -> Result<PendingLoad> {
        self.ensure_not_released()?;
        self.load_generation += 1;
        let generation = self.load_generation;
        self.pending_load = Some(generation);
        debug!("Load {} started ({} bytes)", generation, payload.len());

        let decoder = Arc::clone(&self.decoder);
        let rate = self.engine.sample_rate();
        let decode = move || {
            decoder
                .decode(&payload)
                .map(|asset| Prepared::new(asset, rate))
        };
        let inner = match tokio::runtime::Handle::try_current() {
            Ok(handle) => PendingInner::Blocking {
                generation,
                handle: handle.spawn_blocking(decode),
            },
            Err(_) => PendingInner::Ready(Some(DecodedLoad {
                generation,
                result: decode(),
            })),
        };

        Ok(PendingLoad { inner })
    }

    /// Apply a finished decode
    ///
    /// # Errors
    /// `Superseded` when a newer load was started after this one; the decode
    /// error when the payload was rejected. Either way the current asset and
    /// state are left untouched.
    pub fn apply_load(&mut self, load: DecodedLoad) -> Result<AssetInfo> {
        if self.pending_load != Some(load.generation) {
            debug!("Discarding superseded load {}", load.generation);
            return Err(PlaybackError::Superseded);
        }
        self.pending_load = None;

        match load.result {
            Ok(prepared) => Ok(self.install(prepared, load.generation)),
            Err(err) => {
                warn!("Decoding failed: {}", err);
                Err(self.report(err.into()))
            }
        }
    }

    /// Decode `payload` and install it
    pub async fn load_asset(&mut self, payload: Vec<u8>) -> Result<AssetInfo> {
        let pending = self.begin_load(payload)?;
        let decoded = pending.await;
        self.apply_load(decoded)
    }

    fn install(&mut self, prepared: Prepared, id: u64) -> AssetInfo {
        self.halt();
        self.graph.disconnect();

        let Prepared { asset, converted } = prepared;
        if let Some((rate, samples)) = converted {
            self.conversions.store(id, rate, samples);
        }
        let info = asset.info();
        self.asset = Some(asset);
        self.asset_id = id;
        self.state = PlaybackState::Ready;

        info!("Loaded asset: {}", info);
        self.events.push(PlaybackEvent::AssetLoaded { info });
        self.events.push(PlaybackEvent::StateChanged {
            state: PlaybackState::Ready,
        });
        info
    }

    // ===== Transport =====

    /// Start playback of the loaded asset from offset 0
    ///
    /// Creates and attaches the engine context on first use and resumes it
    /// if suspended. When the asset still needs converting to the context
    /// rate, the transport moves to `Playing` at once and the voice starts
    /// as soon as the conversion finishes on the blocking pool.
    pub fn play(&mut self) -> Result<()> {
        self.sync();
        self.ensure_not_released()?;

        if self.pending_load.is_some() {
            return Err(PlaybackError::Loading);
        }
        match self.state {
            PlaybackState::Idle => return Err(PlaybackError::NoAssetLoaded),
            PlaybackState::Playing => {
                warn!("play() ignored: already playing");
                return Err(PlaybackError::AlreadyPlaying);
            }
            PlaybackState::Ready | PlaybackState::Ended => {}
        }

        let context = match self.ensure_context() {
            Ok(context) => context,
            Err(err) => return Err(self.report(err)),
        };

        if context.state() != ContextState::Running {
            if let Err(err) = context.resume() {
                warn!("Audio context refused to start: {}", err);
                return Err(self.report(err.into()));
            }
        }

        let Some(asset) = self.asset.clone() else {
            return Err(PlaybackError::NoAssetLoaded);
        };
        let rate = context.sample_rate();
        let ready = if asset.sample_rate() == rate {
            Some(asset.shared_samples())
        } else {
            self.conversions.get(self.asset_id, rate)
        };

        self.graph.connect();

        self.play_generation += 1;
        let generation = self.play_generation;
        self.status.begin(generation);

        match ready {
            Some(samples) => {
                let mut renderer = render::lock(&self.renderer);
                let voice =
                    BufferSource::new(samples, asset.channels(), renderer.channels(), generation);
                renderer.start_voice(voice);
            }
            None => {
                let job = VoiceJob {
                    asset,
                    asset_id: self.asset_id,
                    rate,
                    generation,
                    cache: self.conversions.clone(),
                    renderer: Arc::clone(&self.renderer),
                    status: self.status.clone(),
                };
                self.conversion = match tokio::runtime::Handle::try_current() {
                    Ok(handle) => Some(handle.spawn_blocking(move || job.run())),
                    Err(_) => {
                        job.run();
                        None
                    }
                };
            }
        }

        self.state = PlaybackState::Playing;
        self.events.push(PlaybackEvent::StateChanged {
            state: PlaybackState::Playing,
        });
        info!("Playback started ({})", self.graph.settings());
        Ok(())
    }

    /// Stop the current playback instance
    ///
    /// Does nothing unless playing. The path stays connected so a later
    /// `play()` reuses it.
    pub fn stop(&mut self) {
        self.sync();
        if self.engine.is_released() {
            error!("stop() called after the audio engine was released");
            return;
        }
        if self.state != PlaybackState::Playing {
            debug!("stop() ignored in state {:?}", self.state);
            return;
        }

        self.halt();
        self.state = PlaybackState::Ready;
        self.events.push(PlaybackEvent::StateChanged {
            state: PlaybackState::Ready,
        });
        info!("Playback stopped");
    }

    /// Resolves once the current playback instance ends
    ///
    /// Yields true when it played to completion, false when it was stopped
    /// or nothing was playing.
    pub fn wait_for_end(&self) -> impl Future<Output = bool> + Send + 'static {
        let status = self.status.clone();
        let generation = self.play_generation;
        async move {
            if generation == 0 {
                return false;
            }
            status.wait_ended(generation).await
        }
    }

    // ===== Parameters =====

    /// Apply equalizer gains; audible on the next rendered block
    pub fn set_equalizer(&mut self, settings: EqualizerSettings) {
        self.graph.set_equalizer(settings);
        self.events.push(PlaybackEvent::EqualizerChanged { settings });
    }

    /// Set volume (0-100, clamped)
    pub fn set_volume(&mut self, level: u8) {
        self.graph.set_volume(level);
        let level = self.graph.volume();
        debug!("Volume set to {}", level);
        self.events.push(PlaybackEvent::VolumeChanged { level });
    }

    // ===== Visualizer =====

    /// Frame stream for the current playback instance
    ///
    /// Empty when nothing is playing.
    pub fn frames(&self) -> VisualizerFrames {
        let generation = if self.state() == PlaybackState::Playing {
            self.play_generation
        } else {
            0
        };
        VisualizerFrames::new(
            Duration::from_millis(self.config.frame_interval_ms),
            self.graph.snapshot().clone(),
            self.status.clone(),
            generation,
        )
    }

    // ===== Events & lifecycle =====

    /// Take queued events, including an `Ended` detected since the last call
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.sync();
        std::mem::take(&mut self.events)
    }

    /// Tear down playback and close the engine context
    ///
    /// Every later transport call fails with `EngineReleased`.
    pub fn release(&mut self) {
        self.halt();
        self.graph.disconnect();
        self.pending_load = None;
        self.attached = false;
        self.engine.release();
    }

    fn ensure_not_released(&self) -> Result<()> {
        if self.engine.is_released() {
            error!("Audio engine used after release");
            return Err(PlaybackError::EngineReleased);
        }
        Ok(())
    }

    fn ensure_context(&mut self) -> Result<Arc<dyn AudioContext>> {
        let context = self.engine.acquire()?;
        if !self.attached {
            render::lock(&self.renderer).set_format(context.sample_rate(), context.channels());
            context.attach(Arc::clone(&self.renderer))?;
            self.attached = true;
        }
        Ok(context)
    }

    /// Fold a render-side completion or a failed conversion into the state
    /// machine
    fn sync(&mut self) {
        if self.state == PlaybackState::Playing && self.status.has_failed(self.play_generation) {
            self.halt();
            self.state = PlaybackState::Ready;
            let err = PlaybackError::PlaybackStart("sample rate conversion failed".into());
            self.report(err);
            self.events.push(PlaybackEvent::StateChanged {
                state: PlaybackState::Ready,
            });
            return;
        }
        if self.state == PlaybackState::Playing && self.status.has_ended(self.play_generation) {
            self.state = PlaybackState::Ended;
            self.events.push(PlaybackEvent::StateChanged {
                state: PlaybackState::Ended,
            });
            self.events.push(PlaybackEvent::Ended);
            info!("Playback ended");
        }
    }

    /// Silence the current voice and forget the active play request
    fn halt(&mut self) {
        // Status first so a conversion finishing now cannot start its voice
        self.status.clear();
        render::lock(&self.renderer).stop_voice();
        self.graph.snapshot().clear();
    }

    fn report(&mut self, err: PlaybackError) -> PlaybackError {
        self.events.push(PlaybackEvent::Error {
            message: err.to_string(),
        });
        err
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.halt();
        self.graph.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OfflineContext;

    struct RawDecoder;

    impl AudioDecoder for RawDecoder {
        fn decode(&self, payload: &[u8]) -> std::result::Result<AudioAsset, DecodeError> {
            if payload.is_empty() {
                return Err(DecodeError::EmptyPayload);
            }
            let samples: Vec<f32> = payload.iter().map(|&b| f32::from(b) / 255.0).collect();
            Ok(AudioAsset::new(samples, 1_000, 1)?)
        }
    }

    fn controller() -> (PlaybackController, Arc<OfflineContext>) {
        let context = Arc::new(OfflineContext::new(1_000, 1));
        let controller = PlaybackController::with_context(
            PlaybackConfig::default(),
            Arc::new(RawDecoder),
            context.clone(),
        );
        (controller, context)
    }

    #[test]
    fn load_without_runtime_decodes_inline() {
        let (mut controller, _context) = controller();
        let pending = controller.begin_load(vec![1; 10]).unwrap();
        assert!(controller.is_loading());
        assert_eq!(controller.play(), Err(PlaybackError::Loading));

        let decoded = resolve(pending);
        let info = controller.apply_load(decoded).unwrap();

        assert_eq!(info.sample_rate, 1_000);
        assert_eq!(controller.state(), PlaybackState::Ready);
        assert!(!controller.is_loading());
    }

    #[test]
    fn failed_decode_keeps_current_asset() {
        let (mut controller, _context) = controller();
        controller.set_asset(AudioAsset::new(vec![0.5; 10], 1_000, 1).unwrap()).unwrap();

        let pending = controller.begin_load(Vec::new()).unwrap();
        let result = controller.apply_load(resolve(pending));

        assert_eq!(result, Err(PlaybackError::Decode(DecodeError::EmptyPayload)));
        assert_eq!(controller.state(), PlaybackState::Ready);
        assert_eq!(controller.asset().map(AudioAsset::frames), Some(10));
    }

    #[test]
    fn ended_is_reported_once() {
        let (mut controller, context) = controller();
        controller.set_asset(AudioAsset::new(vec![0.5; 100], 1_000, 1).unwrap()).unwrap();
        controller.play().unwrap();
        controller.drain_events();

        context.render_frames(100);
        let events = controller.drain_events();

        assert_eq!(
            events,
            vec![
                PlaybackEvent::StateChanged {
                    state: PlaybackState::Ended
                },
                PlaybackEvent::Ended,
            ]
        );
        assert!(controller.drain_events().is_empty());
    }

    #[test]
    fn conversions_are_reused_across_plays() {
        let context = Arc::new(OfflineContext::new(2_000, 1));
        let mut controller = PlaybackController::with_context(
            PlaybackConfig::default(),
            Arc::new(RawDecoder),
            context,
        );
        controller.set_asset(AudioAsset::new(vec![0.25; 1_000], 1_000, 1).unwrap()).unwrap();

        // Without a runtime the conversion runs inline
        controller.play().unwrap();
        assert!(!controller.is_preparing());
        let first = controller.conversions.get(controller.asset_id, 2_000).unwrap();
        assert_eq!(first.len(), 2_000);
        assert!(render::lock(&controller.renderer).has_voice());

        controller.stop();
        controller.play().unwrap();
        let second = controller.conversions.get(controller.asset_id, 2_000).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn decode_converts_once_the_context_rate_is_known() {
        let context = Arc::new(OfflineContext::new(2_000, 1));
        let mut controller = PlaybackController::with_context(
            PlaybackConfig::default(),
            Arc::new(RawDecoder),
            context,
        );

        let pending = controller.begin_load(vec![64; 500]).unwrap();
        controller.apply_load(resolve(pending)).unwrap();

        let converted = controller.conversions.get(controller.asset_id, 2_000).unwrap();
        assert_eq!(converted.len(), 1_000);
    }

    #[test]
    fn failed_conversion_returns_to_ready() {
        let (mut controller, _context) = controller();
        controller.set_asset(AudioAsset::new(vec![0.5; 10], 1_000, 1).unwrap()).unwrap();
        controller.play().unwrap();
        controller.drain_events();

        controller.status.mark_failed(controller.play_generation);

        assert_eq!(controller.state(), PlaybackState::Ready);
        let events = controller.drain_events();
        assert!(matches!(events.first(), Some(PlaybackEvent::Error { .. })));
        assert!(!render::lock(&controller.renderer).has_voice());
        controller.play().unwrap();
    }

    fn resolve(load: PendingLoad) -> DecodedLoad {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(load)
    }
}
