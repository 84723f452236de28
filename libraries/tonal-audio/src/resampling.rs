//! Sample rate conversion
//!
//! Converts a whole interleaved buffer in fixed-size chunks with rubato's
//! sinc resampler, then trims the resampler delay so the output lines up
//! with the input and has exactly `frames * to / from` frames.

use crate::error::{AudioError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

const CHUNK_FRAMES: usize = 1024;

fn interpolation_params() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}

fn append(output: &mut [Vec<f32>], chunk: Vec<Vec<f32>>) {
    for (channel, data) in output.iter_mut().zip(chunk) {
        channel.extend_from_slice(&data);
    }
}

/// Resample interleaved samples from `from` Hz to `to` Hz
pub fn resample_interleaved(samples: &[f32], channels: usize, from: u32, to: u32) -> Result<Vec<f32>> {
    if channels == 0 || samples.len() % channels != 0 {
        return Err(AudioError::InvalidBuffer(format!(
            "{} samples do not form whole {}-channel frames",
            samples.len(),
            channels
        )));
    }
    if from == 0 || to == 0 {
        return Err(AudioError::Resample(format!("invalid rates {} -> {}", from, to)));
    }
    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let frames = samples.len() / channels;
    let ratio = f64::from(to) / f64::from(from);
    let expected = (frames as f64 * ratio).round() as usize;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, interpolation_params(), CHUNK_FRAMES, channels)?;
    let delay = resampler.output_delay();

    // Deinterleave
    let mut planar = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (channel, &sample) in planar.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    let mut output = vec![Vec::with_capacity(expected + delay); channels];
    let mut pos = 0;

    loop {
        let needed = resampler.input_frames_next();
        if pos + needed > frames {
            break;
        }
        let chunk: Vec<&[f32]> = planar.iter().map(|c| &c[pos..pos + needed]).collect();
        append(&mut output, resampler.process(&chunk, None)?);
        pos += needed;
    }

    if pos < frames {
        let chunk: Vec<&[f32]> = planar.iter().map(|c| &c[pos..]).collect();
        append(&mut output, resampler.process_partial(Some(chunk.as_slice()), None)?);
    }

    // Flush the delay line
    while output[0].len() < expected + delay {
        let tail = resampler.process_partial(None::<&[Vec<f32>]>, None)?;
        if tail.first().map_or(true, Vec::is_empty) {
            break;
        }
        append(&mut output, tail);
    }

    let end = (delay + expected).min(output[0].len());
    let start = delay.min(end);
    let mut interleaved = Vec::with_capacity((end - start) * channels);
    for i in start..end {
        for channel in &output {
            interleaved.push(channel[i]);
        }
    }

    debug!(
        "Resampled {} frames {} Hz -> {} frames {} Hz",
        frames,
        from,
        interleaved.len() / channels,
        to
    );

    Ok(interleaved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, rate: u32, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn same_rate_is_a_copy() {
        let input = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(resample_interleaved(&input, 2, 44_100, 44_100).unwrap(), input);
    }

    #[test]
    fn upsampling_produces_expected_length() {
        let input = sine(440.0, 44_100, 44_100);
        let output = resample_interleaved(&input, 1, 44_100, 48_000).unwrap();
        assert_eq!(output.len(), 48_000);
    }

    #[test]
    fn stereo_downsampling_keeps_channels_interleaved() {
        let mono = sine(220.0, 48_000, 9_600);
        let stereo: Vec<f32> = mono.iter().flat_map(|&s| [s, -s]).collect();

        let output = resample_interleaved(&stereo, 2, 48_000, 44_100).unwrap();
        assert_eq!(output.len(), 8_820 * 2);
        for frame in output.chunks_exact(2).skip(100).take(1000) {
            assert!((frame[0] + frame[1]).abs() < 1e-4);
        }
    }

    #[test]
    fn partial_frames_are_rejected() {
        assert!(matches!(
            resample_interleaved(&[0.0; 3], 2, 44_100, 48_000),
            Err(AudioError::InvalidBuffer(_))
        ));
    }
}
