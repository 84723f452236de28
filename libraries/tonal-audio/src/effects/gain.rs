/// Gain stage (volume multiplier)
use super::chain::AudioEffect;
use super::param::SharedParam;

/// Multiplies every sample by a shared linear gain
///
/// A new gain applies from the next block on, as an instantaneous step.
pub struct GainStage {
    gain: SharedParam,
}

impl GainStage {
    pub fn new(gain: SharedParam) -> Self {
        Self { gain }
    }

    pub fn gain(&self) -> f32 {
        self.gain.get()
    }
}

impl AudioEffect for GainStage {
    fn process(&mut self, buffer: &mut [f32], _sample_rate: u32) {
        let gain = self.gain.get();
        if (gain - 1.0).abs() < f32::EPSILON {
            return;
        }
        for sample in buffer.iter_mut() {
            *sample *= gain;
        }
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "gain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_gain_silences() {
        let mut stage = GainStage::new(SharedParam::new(0.0));
        let mut buffer = vec![0.5, -0.5, 1.0];
        stage.process(&mut buffer, 44_100);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn unity_gain_is_transparent() {
        let mut stage = GainStage::new(SharedParam::new(1.0));
        let mut buffer = vec![0.5, -0.5, 1.0];
        stage.process(&mut buffer, 44_100);
        assert_eq!(buffer, vec![0.5, -0.5, 1.0]);
    }

    #[test]
    fn gain_change_applies_on_next_block() {
        let param = SharedParam::new(0.5);
        let mut stage = GainStage::new(param.clone());

        let mut first = vec![1.0; 4];
        stage.process(&mut first, 44_100);
        param.set(0.25);
        let mut second = vec![1.0; 4];
        stage.process(&mut second, 44_100);

        assert!(first.iter().all(|&s| s == 0.5));
        assert!(second.iter().all(|&s| s == 0.25));
    }
}
