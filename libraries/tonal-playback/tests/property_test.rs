//! Property-based tests for playback parameters

use proptest::prelude::*;
use std::sync::Arc;
use tonal_audio::SymphoniaDecoder;
use tonal_core::{AudioAsset, EqualizerSettings, GAIN_LIMIT_DB};
use tonal_playback::{OfflineContext, PlaybackConfig, PlaybackController, PlaybackState, Volume};

fn controller() -> (PlaybackController, Arc<OfflineContext>) {
    let context = Arc::new(OfflineContext::new(8_000, 2));
    let controller = PlaybackController::with_context(
        PlaybackConfig::default(),
        Arc::new(SymphoniaDecoder::new()),
        context.clone(),
    );
    (controller, context)
}

proptest! {
    #[test]
    fn equalizer_settings_round_trip(bass in -12i32..=12, mid in -12i32..=12, treble in -12i32..=12) {
        let (mut controller, _context) = controller();
        let settings = EqualizerSettings::new(bass, mid, treble);

        controller.set_equalizer(settings);

        prop_assert_eq!(controller.equalizer(), settings);
        prop_assert_eq!(controller.graph().params().band(tonal_core::Band::Mid).get(), mid as f32);
    }

    #[test]
    fn out_of_range_gains_are_clamped(bass in any::<i32>(), treble in any::<i32>()) {
        let settings = EqualizerSettings::new(bass, 0, treble);
        prop_assert!(settings.bass().abs() <= GAIN_LIMIT_DB);
        prop_assert!(settings.treble().abs() <= GAIN_LIMIT_DB);
    }

    #[test]
    fn volume_gain_is_linear(level in any::<u8>()) {
        let volume = Volume::new(level);
        let expected = f32::from(level.min(100)) / 100.0;
        prop_assert!((volume.gain() - expected).abs() < 1e-6);
    }

    #[test]
    fn output_never_exceeds_input_at_flat_eq(level in 0u8..=100, amplitude in 0.0f32..1.0) {
        let (mut controller, context) = controller();
        let asset = AudioAsset::new(vec![amplitude; 800], 8_000, 1).unwrap();
        controller.set_asset(asset).unwrap();
        controller.set_volume(level);
        controller.play().unwrap();

        let output = context.render_frames(800);
        let gain = f32::from(level) / 100.0;
        for sample in output {
            prop_assert!(sample.abs() <= amplitude * gain * 1.05 + 1e-4);
        }
    }

    #[test]
    fn any_transport_sequence_keeps_a_valid_state(ops in prop::collection::vec(0u8..4, 1..30)) {
        let (mut controller, context) = controller();
        controller.set_asset(AudioAsset::new(vec![0.1; 400], 8_000, 1).unwrap()).unwrap();

        for op in ops {
            match op {
                0 => { let _ = controller.play(); }
                1 => controller.stop(),
                2 => { context.render_frames(200); }
                _ => { controller.set_asset(AudioAsset::new(vec![0.1; 400], 8_000, 1).unwrap()).unwrap(); }
            }
            let state = controller.state();
            prop_assert!(state != PlaybackState::Idle);
            if state == PlaybackState::Playing {
                prop_assert!(controller.graph().is_connected());
            }
        }
    }
}
