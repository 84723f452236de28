/// Visualizer frames
use serde::{Deserialize, Serialize};

/// Number of magnitudes in every frame
pub const FRAME_BINS: usize = 20;

/// Normalized spectrum magnitudes, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualizerFrame {
    magnitudes: [f32; FRAME_BINS],
}

impl VisualizerFrame {
    /// Create a frame, clamping values to [0, 100]
    ///
    /// Non-finite values become 0.
    pub fn new(mut magnitudes: [f32; FRAME_BINS]) -> Self {
        for value in &mut magnitudes {
            *value = if value.is_finite() {
                value.clamp(0.0, 100.0)
            } else {
                0.0
            };
        }
        Self { magnitudes }
    }

    /// Frame of all zeros (idle display)
    pub const fn silent() -> Self {
        Self {
            magnitudes: [0.0; FRAME_BINS],
        }
    }

    pub fn magnitudes(&self) -> &[f32; FRAME_BINS] {
        &self.magnitudes
    }

    pub fn len(&self) -> usize {
        FRAME_BINS
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Largest magnitude in the frame
    pub fn peak(&self) -> f32 {
        self.magnitudes.iter().copied().fold(0.0, f32::max)
    }
}

impl Default for VisualizerFrame {
    fn default() -> Self {
        Self::silent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_and_sanitizes() {
        let mut raw = [50.0; FRAME_BINS];
        raw[0] = -4.0;
        raw[1] = 250.0;
        raw[2] = f32::NAN;
        raw[3] = f32::INFINITY;

        let frame = VisualizerFrame::new(raw);
        let values = frame.magnitudes();

        assert_eq!(values[0], 0.0);
        assert_eq!(values[1], 100.0);
        assert_eq!(values[2], 0.0);
        assert_eq!(values[3], 0.0);
        assert_eq!(values[4], 50.0);
        assert_eq!(frame.peak(), 100.0);
    }

    #[test]
    fn silent_frame_is_flat_line() {
        let frame = VisualizerFrame::silent();
        assert_eq!(frame.len(), FRAME_BINS);
        assert_eq!(frame.peak(), 0.0);
    }
}
