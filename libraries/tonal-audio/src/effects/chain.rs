/// Effect chain for processing audio
///
/// Stages are processed in the order they were added. There is no way to
/// bypass or reorder a stage once the chain is built.

/// Trait for audio stages that can be chained together
///
/// # Safety
/// - Must NOT allocate memory in `process()` (real-time constraint)
/// - Must be Send so the chain can move to the audio thread
pub trait AudioEffect: Send {
    /// Process audio buffer in-place
    ///
    /// # Arguments
    /// * `buffer` - Interleaved samples, channel count fixed at construction
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Real-Time Constraints
    /// - No allocations
    /// - No blocking operations
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32);

    /// Reset internal state (e.g. before a new source starts)
    fn reset(&mut self);

    /// Stage name, used to report the wiring order
    fn name(&self) -> &str;
}

/// Chain of audio stages processed in order
pub struct EffectChain {
    effects: Vec<Box<dyn AudioEffect>>,
}

impl EffectChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
        }
    }

    /// Add a stage to the end of the chain
    pub fn add_effect(&mut self, effect: Box<dyn AudioEffect>) {
        self.effects.push(effect);
    }

    /// Process audio through every stage
    pub fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        for effect in &mut self.effects {
            effect.process(buffer, sample_rate);
        }
    }

    /// Reset all stages in the chain
    pub fn reset(&mut self) {
        for effect in &mut self.effects {
            effect.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Stage names in processing order
    pub fn stage_names(&self) -> Vec<&str> {
        self.effects.iter().map(|e| e.name()).collect()
    }
}

impl Default for EffectChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records its name into a shared log whenever it runs
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl AudioEffect for Recorder {
        fn process(&mut self, buffer: &mut [f32], _sample_rate: u32) {
            self.log.lock().unwrap().push(self.name);
            for sample in buffer.iter_mut() {
                *sample += 1.0;
            }
        }

        fn reset(&mut self) {}

        fn name(&self) -> &str {
            self.name
        }
    }

    #[test]
    fn stages_run_in_insertion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = EffectChain::new();
        for name in ["first", "second", "third"] {
            chain.add_effect(Box::new(Recorder {
                name,
                log: Arc::clone(&log),
            }));
        }

        let mut buffer = vec![0.0; 4];
        chain.process(&mut buffer, 44_100);

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
        assert_eq!(chain.stage_names(), vec!["first", "second", "third"]);
        assert!(buffer.iter().all(|&s| s == 3.0));
    }

    #[test]
    fn empty_chain_leaves_buffer_untouched() {
        let mut chain = EffectChain::default();
        let mut buffer = vec![0.25, -0.25];
        chain.process(&mut buffer, 48_000);

        assert!(chain.is_empty());
        assert_eq!(buffer, vec![0.25, -0.25]);
    }
}
