//! Interactive session
//!
//! Wraps one `PlaybackController` and interprets text lines as either
//! transport commands or free-text equalizer commands.

use crate::config::{AppConfig, Backend};
use crate::error::{CliError, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tonal_audio::SymphoniaDecoder;
use tonal_core::{AssetInfo, EqualizerSettings, VisualizerFrame};
use tonal_playback::{OfflineContext, PlaybackController, PlaybackEvent, PlaybackState};
use tracing::{debug, error, info, warn};

/// Block length pulled by the headless clock
const OFFLINE_TICK: Duration = Duration::from_millis(10);
const OFFLINE_RATE: u32 = 44_100;
const OFFLINE_CHANNELS: u16 = 2;

const HELP: &str = "Commands:\n\
  load <file>            decode an audio file\n\
  play | stop            transport\n\
  volume <0-100>         set volume\n\
  eq <bass> <mid> <treble>  set gains in dB\n\
  status                 show state and settings\n\
  quit                   leave\n\
Anything else is read as an equalizer command, e.g. \"boost bass\".";

/// Result of handling one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub message: String,
    pub quit: bool,
}

impl Outcome {
    fn say(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            quit: false,
        }
    }
}

pub struct Session {
    controller: PlaybackController,
    clock: Option<JoinHandle<()>>,
}

impl Session {
    /// Create a session on the configured backend
    ///
    /// The offline backend is driven by a real-time tokio task, so this
    /// must be called inside a runtime.
    pub fn new(config: &AppConfig, backend: Backend) -> Self {
        let decoder = Arc::new(SymphoniaDecoder::new());
        let playback = config.playback_config();

        match backend {
            Backend::Cpal => {
                let engine = Arc::new(tonal_audio_desktop::engine());
                Self {
                    controller: PlaybackController::new(playback, decoder, engine),
                    clock: None,
                }
            }
            Backend::Offline => {
                let context = Arc::new(OfflineContext::new(OFFLINE_RATE, OFFLINE_CHANNELS));
                let clock = tokio::spawn(drive_offline(Arc::clone(&context)));
                Self {
                    controller: PlaybackController::with_context(playback, decoder, context),
                    clock: Some(clock),
                }
            }
        }
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    /// Read and decode a file, replacing the current asset
    pub async fn load(&mut self, path: &Path) -> Result<AssetInfo> {
        let payload = tokio::fs::read(path).await.map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Read {} bytes from {}", payload.len(), path.display());
        Ok(self.controller.load_asset(payload).await?)
    }

    /// Handle one input line
    ///
    /// Errors are turned into messages. The session keeps running unless the
    /// audio engine is gone for good.
    pub async fn handle(&mut self, line: &str) -> Outcome {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command.to_lowercase().as_str() {
            "" => Outcome::say(""),
            "help" | "?" => Outcome::say(HELP),
            "quit" | "exit" => Outcome {
                message: "Bye".to_string(),
                quit: true,
            },
            "load" if !rest.is_empty() => self.handle_load(rest).await,
            "load" => Outcome::say("Usage: load <file>"),
            "play" => match self.controller.play() {
                Ok(()) => Outcome::say("Playing"),
                Err(err) if !err.is_recoverable() => {
                    error!("Playback unavailable: {}", err);
                    Outcome {
                        message: err.user_message(),
                        quit: true,
                    }
                }
                Err(err) => Outcome::say(err.user_message()),
            },
            "stop" => {
                self.controller.stop();
                Outcome::say("Stopped")
            }
            "volume" => match rest.parse::<u8>() {
                Ok(level) => {
                    self.controller.set_volume(level);
                    Outcome::say(format!("Volume: {}", self.controller.volume()))
                }
                Err(_) => Outcome::say("Usage: volume <0-100>"),
            },
            "eq" => match parse_gains(rest) {
                Some(settings) => {
                    self.controller.set_equalizer(settings);
                    Outcome::say(format!("Equalizer: {}", settings))
                }
                None => Outcome::say("Usage: eq <bass> <mid> <treble>"),
            },
            "status" => Outcome::say(self.status()),
            _ => self.handle_text(line),
        }
    }

    async fn handle_load(&mut self, path: &str) -> Outcome {
        let path = Path::new(path);
        match self.load(path).await {
            Ok(info) => Outcome::say(describe(path, &info)),
            Err(CliError::Playback(err)) => {
                warn!("Load failed: {}", err);
                Outcome::say(err.user_message())
            }
            Err(err) => Outcome::say(err.to_string()),
        }
    }

    fn handle_text(&mut self, text: &str) -> Outcome {
        let response = tonal_command::respond(text);
        if let Some(settings) = response.settings {
            info!("Command {:?} -> {}", text, settings);
            self.controller.set_equalizer(settings);
        }
        Outcome::say(response.message)
    }

    fn status(&self) -> String {
        let state = self.controller.state();
        let asset = self
            .controller
            .asset_info()
            .map_or_else(|| "no asset".to_string(), |info| info.to_string());
        format!(
            "State: {:?} ({}), {}, Volume: {}",
            state,
            asset,
            self.controller.equalizer(),
            self.controller.volume()
        )
    }

    /// Take queued controller events
    pub fn events(&mut self) -> Vec<PlaybackEvent> {
        self.controller.drain_events()
    }

    pub fn is_playing(&self) -> bool {
        self.controller.state() == PlaybackState::Playing
    }

    /// Release the engine and stop the headless clock
    pub fn shutdown(&mut self) {
        self.controller.release();
        if let Some(clock) = self.clock.take() {
            clock.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(clock) = self.clock.take() {
            clock.abort();
        }
    }
}

/// Pull audio from an offline context at wall-clock pace
async fn drive_offline(context: Arc<OfflineContext>) {
    let mut interval = tokio::time::interval(OFFLINE_TICK);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let frames = (OFFLINE_TICK.as_secs_f64() * f64::from(OFFLINE_RATE)).round() as usize;
    loop {
        interval.tick().await;
        context.render_frames(frames);
    }
}

/// "name - 2.0s, 1 channel(s)"
pub fn describe(path: &Path, info: &AssetInfo) -> String {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    format!("{} - {}", name, info)
}

fn parse_gains(text: &str) -> Option<EqualizerSettings> {
    let gains: Vec<i32> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match gains.as_slice() {
        [bass, mid, treble] => Some(EqualizerSettings::new(*bass, *mid, *treble)),
        _ => None,
    }
}

/// One text row of bars, one column per visualizer bin
pub fn render_bars(frame: &VisualizerFrame) -> String {
    const LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    frame
        .magnitudes()
        .iter()
        .map(|&m| {
            let index = ((m / 100.0) * (LEVELS.len() - 1) as f32).round() as usize;
            LEVELS[index.min(LEVELS.len() - 1)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_gains() {
        assert_eq!(parse_gains("6 -2 8"), Some(EqualizerSettings::new(6, -2, 8)));
        assert_eq!(parse_gains("6, -2, 8"), Some(EqualizerSettings::new(6, -2, 8)));
        assert_eq!(parse_gains("6 -2"), None);
        assert_eq!(parse_gains("a b c"), None);
    }

    #[test]
    fn bars_scale_with_magnitude() {
        let mut magnitudes = [0.0; tonal_core::FRAME_BINS];
        magnitudes[0] = 100.0;
        magnitudes[1] = 50.0;
        let bars = render_bars(&VisualizerFrame::new(magnitudes));

        assert_eq!(bars.chars().count(), tonal_core::FRAME_BINS);
        assert_eq!(bars.chars().next(), Some('█'));
        assert_eq!(bars.chars().nth(1), Some('▄'));
        assert_eq!(bars.chars().nth(2), Some(' '));
    }

    #[test]
    fn describe_uses_file_name() {
        let info = tonal_core::AudioAsset::new(vec![0.0; 88_200], 44_100, 1)
            .unwrap()
            .info();
        assert_eq!(
            describe(Path::new("/music/song.wav"), &info),
            "song.wav - 2.0s, 1 channel(s)"
        );
    }
}
