/// Tonal - command-line player with a three-band equalizer
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tonal_audio::SymphoniaDecoder;
use tonal_cli::session::describe;
use tonal_cli::{render_bars, AppConfig, Backend, Session};
use tonal_core::{AudioDecoder, EqualizerSettings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tonal")]
#[command(about = "Play audio through a three-band equalizer", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./tonal.toml if present)
    #[arg(short, long, global = true, env = "TONAL_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Render without an audio device
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a file to the end, drawing the spectrum
    Play {
        /// Audio file path
        file: PathBuf,
        /// Bass gain in dB
        #[arg(long, allow_hyphen_values = true)]
        bass: Option<i32>,
        /// Mid gain in dB
        #[arg(long, allow_hyphen_values = true)]
        mid: Option<i32>,
        /// Treble gain in dB
        #[arg(long, allow_hyphen_values = true)]
        treble: Option<i32>,
        /// Volume (0-100)
        #[arg(long)]
        volume: Option<u8>,
        /// Free-text equalizer command, e.g. "rock preset"
        #[arg(long = "command", short = 'C')]
        text: Option<String>,
        /// Do not draw the spectrum
        #[arg(long)]
        quiet: bool,
    },
    /// Decode a file and print its duration and layout
    Probe {
        /// Audio file path
        file: PathBuf,
    },
    /// Show how a free-text command maps to equalizer settings
    Interpret {
        /// Command text
        text: Vec<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive session reading commands from stdin
    Session {
        /// File to load at startup
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "tonal=debug,tonal_cli=debug,tonal_playback=debug,tonal_audio=debug"
    } else {
        "tonal=info,tonal_cli=info,tonal_playback=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let backend = if cli.offline {
        Backend::Offline
    } else {
        config.output.backend
    };

    match cli.command {
        Commands::Play {
            file,
            bass,
            mid,
            treble,
            volume,
            text,
            quiet,
        } => {
            let options = PlayOptions {
                bass,
                mid,
                treble,
                volume,
                text,
                quiet,
            };
            play(&config, backend, &file, options).await?;
        }
        Commands::Probe { file } => {
            probe(&file).await?;
        }
        Commands::Interpret { text, json } => {
            interpret(&text.join(" "), json)?;
        }
        Commands::Session { file } => {
            session(&config, backend, file.as_deref()).await?;
        }
    }

    Ok(())
}

struct PlayOptions {
    bass: Option<i32>,
    mid: Option<i32>,
    treble: Option<i32>,
    volume: Option<u8>,
    text: Option<String>,
    quiet: bool,
}

async fn play(
    config: &AppConfig,
    backend: Backend,
    file: &Path,
    options: PlayOptions,
) -> anyhow::Result<()> {
    let mut session = Session::new(config, backend);
    let info = session
        .load(file)
        .await
        .with_context(|| format!("loading {}", file.display()))?;
    println!("{}", describe(file, &info));

    let controller = session.controller_mut();
    let mut settings = controller.equalizer();
    if let Some(text) = &options.text {
        let response = tonal_command::respond(text);
        println!("{}", response.message);
        if let Some(parsed) = response.settings {
            settings = parsed;
        }
    }
    settings = EqualizerSettings::new(
        options.bass.unwrap_or(settings.bass()),
        options.mid.unwrap_or(settings.mid()),
        options.treble.unwrap_or(settings.treble()),
    );
    controller.set_equalizer(settings);
    if let Some(level) = options.volume {
        controller.set_volume(level);
    }

    controller
        .play()
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .context("starting playback")?;
    tracing::info!("Playing {} with {}", file.display(), settings);

    let mut frames = controller.frames();
    let mut stdout = std::io::stdout();
    loop {
        tokio::select! {
            frame = frames.next() => {
                let Some(frame) = frame else { break };
                if !options.quiet {
                    print!("\r{}", render_bars(&frame));
                    stdout.flush().ok();
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.controller_mut().stop();
                break;
            }
        }
    }
    if !options.quiet {
        println!();
    }

    let ended = session.controller().state() == tonal_playback::PlaybackState::Ended;
    println!("{}", if ended { "Playback ended" } else { "Playback stopped" });
    session.shutdown();
    Ok(())
}

async fn probe(file: &Path) -> anyhow::Result<()> {
    let payload = tokio::fs::read(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;

    let decoder = match file.extension().and_then(|e| e.to_str()) {
        Some(ext) => SymphoniaDecoder::with_extension(ext),
        None => SymphoniaDecoder::new(),
    };
    let asset = tokio::task::spawn_blocking(move || decoder.decode(&payload))
        .await?
        .with_context(|| format!("decoding {}", file.display()))?;

    let info = asset.info();
    println!("{}", describe(file, &info));
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn interpret(text: &str, json: bool) -> anyhow::Result<()> {
    let response = tonal_command::respond(text);
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.message);
    }
    Ok(())
}

async fn session(config: &AppConfig, backend: Backend, file: Option<&Path>) -> anyhow::Result<()> {
    let mut session = Session::new(config, backend);
    if let Some(file) = file {
        let info = session
            .load(file)
            .await
            .with_context(|| format!("loading {}", file.display()))?;
        println!("{}", describe(file, &info));
    }
    println!("Type \"help\" for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };
        let outcome = session.handle(&line).await;
        if !outcome.message.is_empty() {
            println!("{}", outcome.message);
        }
        for event in session.events() {
            if let tonal_playback::PlaybackEvent::Ended = event {
                println!("Playback ended");
            }
        }
        if outcome.quit {
            break;
        }
    }

    session.shutdown();
    Ok(())
}
