/// Visualization tap at the end of the signal path
use super::spectrum::FFT_SIZE;
use crate::effects::AudioEffect;
use std::sync::{Arc, Mutex};

/// Latest time-domain window, shared between the tap and its readers
#[derive(Debug, Clone)]
pub struct SpectrumSnapshot {
    inner: Arc<Mutex<[f32; FFT_SIZE]>>,
}

impl Default for SpectrumSnapshot {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new([0.0; FFT_SIZE])),
        }
    }
}

impl SpectrumSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the most recent window, oldest sample first
    pub fn read(&self) -> [f32; FFT_SIZE] {
        match self.inner.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Publish a window without blocking; skipped if a reader holds the lock
    fn try_publish(&self, window: &[f32; FFT_SIZE]) -> bool {
        match self.inner.try_lock() {
            Ok(mut guard) => {
                *guard = *window;
                true
            }
            Err(_) => false,
        }
    }

    /// Zero the window (nothing is playing)
    pub fn clear(&self) {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = [0.0; FFT_SIZE];
    }
}

/// Pass-through stage that records a mono mix of the signal
pub struct SpectrumTap {
    channels: usize,
    ring: [f32; FFT_SIZE],
    write_pos: usize,
    ordered: [f32; FFT_SIZE],
    snapshot: SpectrumSnapshot,
}

impl SpectrumTap {
    pub fn new(snapshot: SpectrumSnapshot, channels: usize) -> Self {
        Self {
            channels: channels.max(1),
            ring: [0.0; FFT_SIZE],
            write_pos: 0,
            ordered: [0.0; FFT_SIZE],
            snapshot,
        }
    }

    pub fn snapshot(&self) -> &SpectrumSnapshot {
        &self.snapshot
    }
}

impl AudioEffect for SpectrumTap {
    fn process(&mut self, buffer: &mut [f32], _sample_rate: u32) {
        let scale = 1.0 / self.channels as f32;
        for frame in buffer.chunks(self.channels) {
            self.ring[self.write_pos] = frame.iter().sum::<f32>() * scale;
            self.write_pos = (self.write_pos + 1) % FFT_SIZE;
        }

        let (tail, head) = self.ring.split_at(self.write_pos);
        self.ordered[..head.len()].copy_from_slice(head);
        self.ordered[head.len()..].copy_from_slice(tail);
        self.snapshot.try_publish(&self.ordered);
    }

    fn reset(&mut self) {
        self.ring = [0.0; FFT_SIZE];
        self.write_pos = 0;
    }

    fn name(&self) -> &str {
        "tap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_silent() {
        assert_eq!(SpectrumSnapshot::default().read(), [0.0; FFT_SIZE]);
    }

    #[test]
    fn tap_passes_signal_through() {
        let mut tap = SpectrumTap::new(SpectrumSnapshot::new(), 2);
        let mut buffer = vec![0.1, 0.2, 0.3, 0.4];
        tap.process(&mut buffer, 44_100);
        assert_eq!(buffer, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn snapshot_holds_latest_mono_window_in_order() {
        let snapshot = SpectrumSnapshot::new();
        let mut tap = SpectrumTap::new(snapshot.clone(), 2);

        // 100 stereo frames with value i on both channels
        let mut buffer: Vec<f32> = (0..100).flat_map(|i| [i as f32, i as f32]).collect();
        tap.process(&mut buffer, 44_100);

        let window = snapshot.read();
        assert_eq!(window[0], 36.0);
        assert_eq!(window[FFT_SIZE - 1], 99.0);
    }

    #[test]
    fn clear_zeroes_window() {
        let snapshot = SpectrumSnapshot::new();
        let mut tap = SpectrumTap::new(snapshot.clone(), 1);
        let mut buffer = vec![1.0; 128];
        tap.process(&mut buffer, 44_100);

        snapshot.clear();
        assert_eq!(snapshot.read(), [0.0; FFT_SIZE]);
    }
}
