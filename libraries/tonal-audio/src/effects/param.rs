/// Lock-free parameter shared between the control side and the render side
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// An `f32` stored as bits in an atomic
///
/// The control thread writes, the render thread reads once per block.
#[derive(Debug, Clone)]
pub struct SharedParam(Arc<AtomicU32>);

impl SharedParam {
    pub fn new(value: f32) -> Self {
        Self(Arc::new(AtomicU32::new(value.to_bits())))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Default for SharedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}
