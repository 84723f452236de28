//! Conversion of loaded assets to the output rate
//!
//! Resampling a whole asset never runs inside `play()` when a runtime is
//! available. It is folded into the decode task when the output rate is
//! already known, otherwise it runs on the blocking pool while the play
//! request waits for its voice.

use crate::render::{self, SharedRenderer, TransportStatus};
use crate::source::BufferSource;
use std::sync::{Arc, Mutex, MutexGuard};
use tonal_audio::AudioError;
use tonal_core::AudioAsset;
use tracing::{debug, error, warn};

/// Samples of `asset` at `rate`
pub(crate) fn convert(asset: &AudioAsset, rate: u32) -> Result<Arc<[f32]>, AudioError> {
    if asset.sample_rate() == rate {
        return Ok(asset.shared_samples());
    }

    debug!("Resampling asset {} Hz -> {} Hz", asset.sample_rate(), rate);
    let converted = tonal_audio::resample_interleaved(
        asset.samples(),
        usize::from(asset.channels()),
        asset.sample_rate(),
        rate,
    )?;
    Ok(Arc::from(converted))
}

/// Decoded asset, already converted when the output rate was known
#[derive(Debug)]
pub(crate) struct Prepared {
    pub(crate) asset: AudioAsset,
    pub(crate) converted: Option<(u32, Arc<[f32]>)>,
}

impl Prepared {
    pub(crate) fn new(asset: AudioAsset, rate: Option<u32>) -> Self {
        let converted = rate
            .filter(|&rate| rate != asset.sample_rate())
            .and_then(|rate| match convert(&asset, rate) {
                Ok(samples) => Some((rate, samples)),
                Err(err) => {
                    warn!("Resampling after decode failed: {}", err);
                    None
                }
            });
        Self { asset, converted }
    }
}

#[derive(Debug)]
struct Converted {
    asset: u64,
    rate: u32,
    samples: Arc<[f32]>,
}

/// Most recent conversion, keyed by asset and output rate
#[derive(Debug, Clone, Default)]
pub(crate) struct ConversionCache {
    inner: Arc<Mutex<Option<Converted>>>,
}

impl ConversionCache {
    fn lock(&self) -> MutexGuard<'_, Option<Converted>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn get(&self, asset: u64, rate: u32) -> Option<Arc<[f32]>> {
        self.lock()
            .as_ref()
            .filter(|c| c.asset == asset && c.rate == rate)
            .map(|c| Arc::clone(&c.samples))
    }

    pub(crate) fn store(&self, asset: u64, rate: u32, samples: Arc<[f32]>) {
        *self.lock() = Some(Converted {
            asset,
            rate,
            samples,
        });
    }
}

/// Conversion owed to one play request
///
/// Starts the voice once the samples exist, unless the request was stopped
/// or replaced in the meantime.
pub(crate) struct VoiceJob {
    pub(crate) asset: AudioAsset,
    pub(crate) asset_id: u64,
    pub(crate) rate: u32,
    pub(crate) generation: u64,
    pub(crate) cache: ConversionCache,
    pub(crate) renderer: SharedRenderer,
    pub(crate) status: TransportStatus,
}

impl VoiceJob {
    pub(crate) fn run(self) {
        let samples = match convert(&self.asset, self.rate) {
            Ok(samples) => samples,
            Err(err) => {
                error!("Resampling for play request {} failed: {}", self.generation, err);
                self.status.mark_failed(self.generation);
                return;
            }
        };
        self.cache.store(self.asset_id, self.rate, Arc::clone(&samples));

        // Checked under the renderer lock; stopping clears the status first
        let mut renderer = render::lock(&self.renderer);
        if self.status.active_generation() != self.generation {
            debug!("Play request {} ended before its samples were ready", self.generation);
            return;
        }
        let voice = BufferSource::new(
            samples,
            self.asset.channels(),
            renderer.channels(),
            self.generation,
        );
        renderer.start_voice(voice);
        debug!("Play request {} started after conversion", self.generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Renderer;

    fn asset(rate: u32) -> AudioAsset {
        AudioAsset::new(vec![0.25; 1_000], rate, 1).unwrap()
    }

    #[test]
    fn matching_rate_shares_the_asset_buffer() {
        let asset = asset(2_000);
        let samples = convert(&asset, 2_000).unwrap();
        assert!(Arc::ptr_eq(&samples, &asset.shared_samples()));
    }

    #[test]
    fn decode_result_is_converted_only_for_another_rate() {
        assert!(Prepared::new(asset(1_000), None).converted.is_none());
        assert!(Prepared::new(asset(1_000), Some(1_000)).converted.is_none());

        let prepared = Prepared::new(asset(1_000), Some(2_000));
        let (rate, samples) = prepared.converted.unwrap();
        assert_eq!(rate, 2_000);
        assert_eq!(samples.len(), 2_000);
    }

    #[test]
    fn cache_is_keyed_by_asset_and_rate() {
        let cache = ConversionCache::default();
        cache.store(3, 48_000, Arc::from(vec![0.0; 4]));

        assert!(cache.get(3, 48_000).is_some());
        assert!(cache.get(3, 44_100).is_none());
        assert!(cache.get(4, 48_000).is_none());
    }

    #[test]
    fn job_skips_voice_for_a_stopped_request() {
        let status = TransportStatus::new();
        let renderer = Renderer::new(2_000, 1, status.clone()).shared();
        let cache = ConversionCache::default();
        status.begin(1);
        status.clear();

        VoiceJob {
            asset: asset(1_000),
            asset_id: 1,
            rate: 2_000,
            generation: 1,
            cache: cache.clone(),
            renderer: Arc::clone(&renderer),
            status,
        }
        .run();

        assert!(!render::lock(&renderer).has_voice());
        assert!(cache.get(1, 2_000).is_some());
    }
}
