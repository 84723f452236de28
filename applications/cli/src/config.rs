/// Application configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tonal_core::EqualizerSettings;
use tonal_playback::PlaybackConfig;

/// File read when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "tonal.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    /// Equalizer applied at startup
    #[serde(default)]
    pub equalizer: EqualizerSettings,

    #[serde(default = "default_output")]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    /// Startup volume (0-100)
    #[serde(default = "default_volume")]
    pub volume: u8,

    /// Visualizer cadence in milliseconds
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub backend: Backend,
}

/// Where rendered audio goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Default output device
    #[default]
    Cpal,
    /// Rendered in real time and discarded (headless)
    Offline,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            playback: default_playback(),
            equalizer: EqualizerSettings::flat(),
            output: default_output(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// `path` must exist when given; otherwise `tonal.toml` in the working
    /// directory is read if present. Environment variables prefixed with
    /// `TONAL_` override the file, e.g. `TONAL_PLAYBACK__VOLUME=40`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file {} not found",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("TONAL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.playback.volume > 100 {
            return Err(CliError::Config(format!(
                "playback.volume must be 0-100, got {}",
                self.playback.volume
            )));
        }
        if self.playback.frame_interval_ms == 0 {
            return Err(CliError::Config(
                "playback.frame_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Controller configuration derived from these settings
    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            volume: self.playback.volume,
            equalizer: self.equalizer,
            frame_interval_ms: self.playback.frame_interval_ms,
        }
    }
}

// Default values
fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        volume: default_volume(),
        frame_interval_ms: default_frame_interval_ms(),
    }
}

fn default_volume() -> u8 {
    70
}

fn default_frame_interval_ms() -> u64 {
    50
}

fn default_output() -> OutputSettings {
    OutputSettings {
        backend: Backend::default(),
    }
}
