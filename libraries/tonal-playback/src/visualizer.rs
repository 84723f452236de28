//! Visualizer frame stream
//!
//! Frames are sampled from the spectrum tap on a fixed timer while one play
//! request is active. The stream ends for good once that request stops.

use crate::render::TransportStatus;
use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tonal_audio::{SpectrumAnalyzer, SpectrumSnapshot, BIN_COUNT};
use tonal_core::{VisualizerFrame, FRAME_BINS};

/// Map the low end of an analyzer spectrum to a visualizer frame
///
/// Takes the first `FRAME_BINS` byte magnitudes and scales them to 0-100.
pub fn frame_from_spectrum(spectrum: &[u8; BIN_COUNT]) -> VisualizerFrame {
    let mut magnitudes = [0.0f32; FRAME_BINS];
    for (out, &value) in magnitudes.iter_mut().zip(spectrum.iter()) {
        *out = f32::from(value) / 255.0 * 100.0;
    }
    VisualizerFrame::new(magnitudes)
}

/// Lazy, finite stream of visualizer frames for one play request
///
/// The timer starts on the first `next()` call. Each tick yields at most
/// one frame; ticks missed by a slow consumer are skipped.
pub struct VisualizerFrames {
    period: Duration,
    interval: Option<Interval>,
    analyzer: SpectrumAnalyzer,
    snapshot: SpectrumSnapshot,
    status: TransportStatus,
    generation: u64,
    finished: bool,
}

impl VisualizerFrames {
    pub(crate) fn new(
        period: Duration,
        snapshot: SpectrumSnapshot,
        status: TransportStatus,
        generation: u64,
    ) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            interval: None,
            analyzer: SpectrumAnalyzer::new(),
            snapshot,
            status,
            generation,
            finished: false,
        }
    }

    /// Wait for the next tick and sample a frame
    ///
    /// Returns `None` once the play request this stream follows is no
    /// longer playing (stopped, replaced, or ended).
    pub async fn next(&mut self) -> Option<VisualizerFrame> {
        if !self.still_playing() {
            return None;
        }

        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        interval.tick().await;

        if !self.still_playing() {
            return None;
        }

        let spectrum = self.analyzer.analyze(&self.snapshot.read());
        Some(frame_from_spectrum(&spectrum))
    }

    fn still_playing(&mut self) -> bool {
        if !self.finished && !self.status.is_playing(self.generation) {
            self.finished = true;
            self.interval = None;
        }
        !self.finished
    }

    /// Whether the stream has ended
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Sampling period
    pub fn period(&self) -> Duration {
        self.period
    }
}
