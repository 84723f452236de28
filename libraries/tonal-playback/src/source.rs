//! Buffer source (one playback voice)
//!
//! Reads a decoded sample buffer from offset 0 to the end exactly once and
//! maps its channels onto the output layout.

use std::sync::Arc;

/// One-shot voice over a shared sample buffer
#[derive(Debug, Clone)]
pub struct BufferSource {
    samples: Arc<[f32]>,
    channels: usize,
    output_channels: usize,
    position: usize,
    frames: usize,
    generation: u64,
}

impl BufferSource {
    /// Create a voice for `samples` (interleaved, `channels` wide) that
    /// renders into `output_channels`
    ///
    /// `generation` identifies the play request this voice belongs to.
    pub fn new(samples: Arc<[f32]>, channels: u16, output_channels: u16, generation: u64) -> Self {
        let channels = usize::from(channels.max(1));
        let frames = samples.len() / channels;
        Self {
            samples,
            channels,
            output_channels: usize::from(output_channels.max(1)),
            position: 0,
            frames,
            generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current position in frames
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total length in frames
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.frames
    }

    /// Fill `output` with the next frames; returns the number of frames written
    ///
    /// Frames past the end of the buffer are left untouched.
    pub fn read(&mut self, output: &mut [f32]) -> usize {
        let out_ch = self.output_channels;
        let src_ch = self.channels;
        let wanted = output.len() / out_ch;
        let count = wanted.min(self.frames - self.position);

        let start = self.position * src_ch;
        let input = &self.samples[start..start + count * src_ch];

        for (src, dst) in input
            .chunks_exact(src_ch)
            .zip(output.chunks_exact_mut(out_ch))
        {
            map_frame(src, dst);
        }

        self.position += count;
        count
    }
}

/// Copy one frame between channel layouts
fn map_frame(src: &[f32], dst: &mut [f32]) {
    if src.len() == dst.len() {
        dst.copy_from_slice(src);
    } else if src.len() == 1 {
        // Mono to every output channel
        dst.fill(src[0]);
    } else if dst.len() == 1 {
        // Average down to mono
        dst[0] = src.iter().sum::<f32>() / src.len() as f32;
    } else {
        let common = src.len().min(dst.len());
        dst[..common].copy_from_slice(&src[..common]);
        dst[common..].fill(0.0);
    }
}
