//! Output device tests
//!
//! Hardware-dependent tests are marked with `#[ignore]` and can be run with:
//! cargo test -p tonal-audio-desktop -- --ignored

use std::sync::Arc;
use std::time::Duration;
use tonal_audio::SymphoniaDecoder;
use tonal_audio_desktop::CpalContext;
use tonal_core::AudioAsset;
use tonal_playback::{AudioContext, ContextState, PlaybackConfig, PlaybackController, PlaybackState};

#[test]
fn lazy_engine_does_not_open_device() {
    let engine = tonal_audio_desktop::engine();
    assert!(!engine.is_initialized());
    engine.release();
    assert!(engine.is_released());
}

#[test]
#[ignore = "Requires audio hardware"]
fn context_lifecycle() {
    let context = CpalContext::open().unwrap();
    assert!(context.sample_rate() > 0);
    assert!(context.channels() > 0);
    assert_eq!(context.state(), ContextState::Suspended);

    context.resume().unwrap();
    assert_eq!(context.state(), ContextState::Running);
    context.suspend().unwrap();
    assert_eq!(context.state(), ContextState::Suspended);

    context.close();
    assert_eq!(context.state(), ContextState::Closed);
    assert!(context.resume().is_err());
}

#[test]
#[ignore = "Requires audio hardware"]
fn short_tone_plays_to_end() {
    let engine = Arc::new(tonal_audio_desktop::engine());
    let mut controller = PlaybackController::new(
        PlaybackConfig::default(),
        Arc::new(SymphoniaDecoder::new()),
        engine,
    );

    let rate = 44_100;
    let samples: Vec<f32> = (0..rate / 4)
        .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / rate as f32).sin() * 0.2)
        .collect();
    controller
        .set_asset(AudioAsset::new(samples, rate, 1).unwrap())
        .unwrap();

    controller.play().unwrap();
    std::thread::sleep(Duration::from_millis(600));
    assert_eq!(controller.state(), PlaybackState::Ended);
    controller.release();
}
