/// FFT spectrum analyzer
///
/// Same scaling as a browser analyser node: Blackman window, magnitude
/// divided by FFT size, exponential smoothing between reads, and decibels
/// mapped linearly from [min_db, max_db] onto 0..=255.
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Samples per analysis window
pub const FFT_SIZE: usize = 64;

/// Frequency bins produced per analysis (half the FFT size)
pub const BIN_COUNT: usize = FFT_SIZE / 2;

const DEFAULT_SMOOTHING: f32 = 0.8;
const DEFAULT_MIN_DB: f32 = -100.0;
const DEFAULT_MAX_DB: f32 = -30.0;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: [f32; FFT_SIZE],
    smoothed: [f32; BIN_COUNT],
    scratch: Vec<Complex<f32>>,
    smoothing: f32,
    min_db: f32,
    max_db: f32,
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        // Blackman window (alpha = 0.16)
        let mut window = [0.0; FFT_SIZE];
        for (i, w) in window.iter_mut().enumerate() {
            let x = i as f32 / FFT_SIZE as f32;
            *w = 0.42 - 0.5 * (2.0 * std::f32::consts::PI * x).cos()
                + 0.08 * (4.0 * std::f32::consts::PI * x).cos();
        }

        Self {
            fft,
            window,
            smoothed: [0.0; BIN_COUNT],
            scratch: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            smoothing: DEFAULT_SMOOTHING,
            min_db: DEFAULT_MIN_DB,
            max_db: DEFAULT_MAX_DB,
        }
    }

    /// Set the smoothing time constant (clamped to [0, 1))
    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing.clamp(0.0, 0.99);
        self
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Analyze one window and return byte-scaled magnitudes per bin
    pub fn analyze(&mut self, time_domain: &[f32; FFT_SIZE]) -> [u8; BIN_COUNT] {
        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(time_domain).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let mut bytes = [0u8; BIN_COUNT];
        let range = self.max_db - self.min_db;

        for (bin, byte) in bytes.iter_mut().enumerate() {
            let magnitude = self.scratch[bin].norm() / FFT_SIZE as f32;
            let previous = self.smoothed[bin];
            let mut value = self.smoothing * previous + (1.0 - self.smoothing) * magnitude;
            if !value.is_finite() {
                value = 0.0;
            }
            self.smoothed[bin] = value;

            let db = if value > 0.0 {
                20.0 * value.log10()
            } else {
                f32::NEG_INFINITY
            };
            let scaled = 255.0 / range * (db - self.min_db);
            *byte = scaled.clamp(0.0, 255.0) as u8;
        }

        bytes
    }

    /// Forget smoothing history
    pub fn reset(&mut self) {
        self.smoothed = [0.0; BIN_COUNT];
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(bin: usize, amplitude: f32) -> [f32; FFT_SIZE] {
        let mut samples = [0.0; FFT_SIZE];
        for (i, s) in samples.iter_mut().enumerate() {
            *s = amplitude
                * (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / FFT_SIZE as f32).sin();
        }
        samples
    }

    #[test]
    fn silence_maps_to_zero() {
        let mut analyzer = SpectrumAnalyzer::new();
        assert_eq!(analyzer.analyze(&[0.0; FFT_SIZE]), [0u8; BIN_COUNT]);
    }

    #[test]
    fn tone_peaks_at_its_bin() {
        let mut analyzer = SpectrumAnalyzer::new().with_smoothing(0.0);
        let bytes = analyzer.analyze(&tone(8, 0.05));

        let peak = bytes
            .iter()
            .enumerate()
            .max_by_key(|&(_, b)| *b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 8);
        assert!(bytes[8] > 200);
        assert!(bytes[20] < bytes[8]);
    }

    #[test]
    fn smoothing_blends_successive_reads() {
        let mut smooth = SpectrumAnalyzer::new();
        let mut raw = SpectrumAnalyzer::new().with_smoothing(0.0);
        let signal = tone(4, 0.5);

        let first_smooth = smooth.analyze(&signal);
        let first_raw = raw.analyze(&signal);
        assert!(first_smooth[4] < first_raw[4]);

        // Repeated reads converge toward the unsmoothed value
        let mut latest = first_smooth;
        for _ in 0..60 {
            latest = smooth.analyze(&signal);
        }
        assert!(latest[4].abs_diff(first_raw[4]) <= 1);
    }

    #[test]
    fn reset_clears_history() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.analyze(&tone(4, 0.5));
        analyzer.reset();
        assert_eq!(analyzer.analyze(&[0.0; FFT_SIZE]), [0u8; BIN_COUNT]);
    }
}
