use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use sound_manager::audio::{AudioDriver, DirectoryResolver, EffectChannel, SoundManager};
use sound_manager::config::{JsonSettingsStore, SettingsStore};
use sound_manager::util::logging::init_logging;

const UPDATE_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Parser)]
#[command(name = "soundboard", about = "Play music, ambience and effects from an asset folder")]
struct Cli {
    /// Asset directory to search (repeatable, searched in order)
    #[arg(long = "assets", value_name = "DIR")]
    assets: Vec<PathBuf>,

    /// Settings file (defaults to the per-user config directory)
    #[arg(long, env = "SOUNDBOARD_SETTINGS")]
    settings: Option<PathBuf>,

    /// Seconds to keep looping sounds playing
    #[arg(long, default_value_t = 10)]
    seconds: u64,

    /// Write logs to this directory as well
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Loop background music
    Music { name: String },
    /// Loop an ambient sound
    Ambient { name: String },
    /// Loop a weather sound
    Weather { name: String },
    /// Play an effect once and wait for it to finish
    Effect {
        name: String,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=4))]
        channel: u8,
    },
    /// Show or change the persisted playback toggles
    Toggles {
        #[arg(long)]
        music: Option<Switch>,
        #[arg(long)]
        sounds: Option<Switch>,
        #[arg(long)]
        effects: Option<Switch>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl Switch {
    fn enabled(self) -> bool {
        matches!(self, Switch::On)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_dir.as_deref(), cli.verbose)?;

    let store = match &cli.settings {
        Some(path) => JsonSettingsStore::new(path),
        None => JsonSettingsStore::default_location(),
    };

    if let Command::Toggles {
        music,
        sounds,
        effects,
    } = &cli.command
    {
        let mut settings = store.load()?;
        if let Some(switch) = music {
            settings.play_background_music = switch.enabled();
        }
        if let Some(switch) = sounds {
            settings.play_background_sounds = switch.enabled();
        }
        if let Some(switch) = effects {
            settings.play_sound_effects = switch.enabled();
        }
        store.save(&settings)?;
        info!(path = %store.path().display(), "Saved sound settings");
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let roots = if cli.assets.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.assets.clone()
    };
    let driver = AudioDriver::new().context("Failed to open audio output")?;
    let mut sound = SoundManager::new(driver, DirectoryResolver::new(roots)).with_settings_store(store);

    let looping_for = Duration::from_secs(cli.seconds);
    match cli.command {
        Command::Music { name } => {
            sound.start_music(name.as_str());
            run_for(&mut sound, looping_for);
        }
        Command::Ambient { name } => {
            sound.play_ambient(name.as_str());
            run_for(&mut sound, looping_for);
        }
        Command::Weather { name } => {
            sound.play_weather(name.as_str());
            run_for(&mut sound, looping_for);
        }
        Command::Effect { name, channel } => {
            let Some(channel) = EffectChannel::from_number(channel) else {
                bail!("No such effect channel: {channel}");
            };
            let done = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&done);
            sound.play_effect_then(name.as_str(), channel, move |reason| {
                info!(?reason, "Effect finished");
                flag.store(true, Ordering::SeqCst);
            });

            let started = Instant::now();
            while !done.load(Ordering::SeqCst) && started.elapsed() < looping_for {
                sound.update();
                thread::sleep(UPDATE_INTERVAL);
            }
        }
        Command::Toggles { .. } => {}
    }

    sound.stop_all();
    Ok(())
}

fn run_for(sound: &mut SoundManager<AudioDriver>, duration: Duration) {
    let started = Instant::now();
    while started.elapsed() < duration {
        sound.update();
        thread::sleep(UPDATE_INTERVAL);
    }
}
