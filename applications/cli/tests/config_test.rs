//! Configuration loading tests

use std::io::Write;
use tempfile::NamedTempFile;
use tonal_cli::{AppConfig, Backend};
use tonal_core::EqualizerSettings;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_values_from_file() {
    let file = write_config(
        r#"
[playback]
volume = 40
frame_interval_ms = 100

[equalizer]
bass = 6
mid = -2
treble = 8

[output]
backend = "offline"
"#,
    );

    let config = AppConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.playback.volume, 40);
    assert_eq!(config.playback.frame_interval_ms, 100);
    assert_eq!(config.equalizer, EqualizerSettings::new(6, -2, 8));
    assert_eq!(config.output.backend, Backend::Offline);
}

#[test]
fn missing_sections_use_defaults() {
    let file = write_config("[playback]\nvolume = 55\n");

    let config = AppConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.playback.volume, 55);
    assert_eq!(config.playback.frame_interval_ms, 50);
    assert!(config.equalizer.is_flat());
    assert_eq!(config.output.backend, Backend::Cpal);
}

#[test]
fn equalizer_gains_are_clamped() {
    let file = write_config("[equalizer]\nbass = 40\ntreble = -40\n");

    let config = AppConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.equalizer, EqualizerSettings::new(12, 0, -12));
}

#[test]
fn invalid_values_are_rejected() {
    let file = write_config("[playback]\nvolume = 120\n");
    assert!(AppConfig::load(Some(file.path())).is_err());

    let file = write_config("[playback]\nframe_interval_ms = 0\n");
    assert!(AppConfig::load(Some(file.path())).is_err());
}

#[test]
fn explicit_path_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = AppConfig::load(Some(missing.as_path())).unwrap_err();
    assert!(err.to_string().contains("not found"));
}
