//! Equalizer filter graph
//!
//! The signal path is a fixed pipeline: bass -> mid -> treble -> gain ->
//! visualization tap. `FilterGraph` is the control-side handle: it owns the
//! requested settings and writes gains into lock-free parameters that the
//! connected path reads on every block.

use crate::render::{self, SharedRenderer};
use crate::volume::Volume;
use tonal_audio::{EffectChain, FilterNode, GainStage, SharedParam, SpectrumSnapshot, SpectrumTap};
use tonal_core::{Band, EqualizerSettings};
use tracing::debug;

/// Live gain parameters read by the render side
#[derive(Debug, Clone)]
pub struct GraphParams {
    bass: SharedParam,
    mid: SharedParam,
    treble: SharedParam,
    gain: SharedParam,
}

impl GraphParams {
    pub fn new(settings: EqualizerSettings, gain: f32) -> Self {
        Self {
            bass: SharedParam::new(settings.bass() as f32),
            mid: SharedParam::new(settings.mid() as f32),
            treble: SharedParam::new(settings.treble() as f32),
            gain: SharedParam::new(gain),
        }
    }

    pub fn band(&self, band: Band) -> &SharedParam {
        match band {
            Band::Bass => &self.bass,
            Band::Mid => &self.mid,
            Band::Treble => &self.treble,
        }
    }

    pub fn gain(&self) -> &SharedParam {
        &self.gain
    }

    fn apply(&self, settings: EqualizerSettings) {
        for band in Band::ALL {
            self.band(band).set(settings.get(band) as f32);
        }
    }
}

/// A wired chain of stages in the fixed order
pub struct SignalPath {
    chain: EffectChain,
}

impl SignalPath {
    /// Allocate fresh nodes for `channels` interleaved channels
    pub fn new(params: &GraphParams, snapshot: SpectrumSnapshot, channels: u16) -> Self {
        let channels = usize::from(channels.max(1));
        let mut chain = EffectChain::new();
        for band in Band::ALL {
            chain.add_effect(Box::new(FilterNode::new(
                band,
                params.band(band).clone(),
                channels,
            )));
        }
        chain.add_effect(Box::new(GainStage::new(params.gain().clone())));
        chain.add_effect(Box::new(SpectrumTap::new(snapshot, channels)));
        Self { chain }
    }

    pub fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        self.chain.process(buffer, sample_rate);
    }

    pub fn reset(&mut self) {
        self.chain.reset();
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.chain.stage_names()
    }
}

/// Control-side handle to the equalizer and volume
pub struct FilterGraph {
    params: GraphParams,
    settings: EqualizerSettings,
    volume: Volume,
    snapshot: SpectrumSnapshot,
    renderer: SharedRenderer,
}

impl FilterGraph {
    pub fn new(renderer: SharedRenderer, settings: EqualizerSettings, volume: Volume) -> Self {
        Self {
            params: GraphParams::new(settings, volume.gain()),
            settings,
            volume,
            snapshot: SpectrumSnapshot::new(),
            renderer,
        }
    }

    /// Apply equalizer gains; takes effect on the next rendered block
    pub fn set_equalizer(&mut self, settings: EqualizerSettings) {
        self.settings = settings;
        self.params.apply(settings);
        debug!("Equalizer set to {}", settings);
    }

    /// Currently applied equalizer settings
    pub fn settings(&self) -> EqualizerSettings {
        self.settings
    }

    /// Set volume (0-100), clamped
    pub fn set_volume(&mut self, level: u8) {
        self.volume.set_level(level);
        self.params.gain().set(self.volume.gain());
    }

    pub fn volume(&self) -> u8 {
        self.volume.level()
    }

    /// Multiplier applied by the gain stage
    pub fn gain_multiplier(&self) -> f32 {
        self.params.gain().get()
    }

    pub fn params(&self) -> &GraphParams {
        &self.params
    }

    /// Snapshot written by the visualization tap
    pub fn snapshot(&self) -> &SpectrumSnapshot {
        &self.snapshot
    }

    /// Wire the signal path if it is not connected
    ///
    /// Returns true when fresh nodes were allocated, false when the path was
    /// already connected.
    pub fn connect(&self) -> bool {
        let channels = {
            let renderer = render::lock(&self.renderer);
            if renderer.is_connected() {
                return false;
            }
            renderer.channels()
        };

        let path = SignalPath::new(&self.params, self.snapshot.clone(), channels);

        let mut renderer = render::lock(&self.renderer);
        if renderer.is_connected() {
            return false;
        }
        renderer.connect_path(path);
        debug!("Signal path connected ({} channels)", channels);
        true
    }

    /// Drop the signal path (and any voice feeding it)
    pub fn disconnect(&self) {
        let mut renderer = render::lock(&self.renderer);
        if renderer.is_connected() {
            renderer.disconnect_path();
            debug!("Signal path disconnected");
        }
        self.snapshot.clear();
    }

    pub fn is_connected(&self) -> bool {
        render::lock(&self.renderer).is_connected()
    }

    /// Stage names of the connected path, in processing order
    pub fn stage_names(&self) -> Vec<String> {
        render::lock(&self.renderer).stage_names()
    }
}
