use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use picture_slider::audio::Device;
use picture_slider::config::{AudioKind, Config};
use picture_slider::puzzle::{grid_size_for_level, Puzzle};
use picture_slider::shell::App;

#[derive(Parser, Debug)]
#[command(name = "picture-slider", version, about = "Sliding picture puzzle for the terminal")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Level to start at
    #[arg(long)]
    level: Option<u32>,
    /// Seed for reproducible shuffles
    #[arg(long)]
    seed: Option<u64>,
    /// Sound effect backend
    #[arg(long, value_enum)]
    audio: Option<AudioKind>,
    /// Only deal arrangements that can be solved by sliding
    #[arg(long)]
    solvable_only: bool,
    /// Print a shuffled puzzle for the starting level and exit
    #[arg(long)]
    print: bool,
    /// Tracing filter, e.g. "info", "picture_slider=debug"
    #[arg(long, default_value = "info")]
    log: String,
    /// Write logs to this file (the terminal is busy with the game)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_new(&args.log)
        .with_context(|| format!("invalid log filter {:?}", args.log))?;

    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None if args.print => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        None => {}
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(level) = args.level {
        config.start_level = level;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(audio) = args.audio {
        config.audio.backend = audio;
    }
    config.solvable_only |= args.solvable_only;

    config.validate()?;
    Ok(config)
}

fn print_puzzle(config: &Config) {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let size = grid_size_for_level(config.start_level);

    let solved = Puzzle::solved(size);
    println!("Level {} ({size}x{size}), solved:\n{}", config.start_level, solved);

    let puzzle = Puzzle::shuffled(size, &mut rng, config.solvable_only);
    let verdict = if puzzle.is_solvable() {
        "solvable"
    } else {
        "not solvable by sliding"
    };
    println!("Shuffled ({verdict}):\n{puzzle}");
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;
    let config = load_config(&args)?;
    info!(?config, "configuration loaded");

    if args.print {
        print_puzzle(&config);
        return Ok(());
    }

    let device = match Device::open(config.audio.backend) {
        Ok(device) => device,
        Err(err) => {
            warn!("{err}; falling back to the terminal bell");
            Device::open(AudioKind::Bell)?
        }
    };

    let mut app = App::new(&config, device.sfx());
    app.run().context("terminal session failed")?;

    Ok(())
}
