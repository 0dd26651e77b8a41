use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use choreo_core::{ChoreoConfig, ReducedMotion, SiteContent};

mod commands;

/// Set to 1 or true to report a reduced-motion preference from the host
const REDUCED_MOTION_ENV: &str = "CHOREO_REDUCED_MOTION";

#[derive(Parser)]
#[command(name = "choreo")]
#[command(author, version, about = "Scroll and reveal choreography in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Reduced motion: on, off or auto (follows CHOREO_REDUCED_MOTION)
    #[arg(long, global = true)]
    reduced_motion: Option<ReducedMotion>,

    /// Frames per second while anything animates
    #[arg(long, global = true)]
    fps: Option<u32>,

    /// Page content as JSON (same shape as `choreo content`)
    #[arg(long, global = true)]
    content: Option<PathBuf>,

    /// Configuration file (defaults to ~/.config/choreo/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the page preview
    Run,
    /// Play only the typewriter loader, then exit
    Loader,
    /// Print the effective configuration as TOML
    Config {
        /// Write it to the configuration file as well
        #[arg(long)]
        save: bool,
    },
    /// Print the page content as JSON
    Content,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration, then apply flag overrides
    let mut config = match &cli.config {
        Some(path) => ChoreoConfig::load_from(path)?,
        None => ChoreoConfig::load()?,
    };
    if let Some(reduced_motion) = cli.reduced_motion {
        config.autoplay.reduced_motion = reduced_motion;
    }
    if let Some(fps) = cli.fps {
        config.ui.fps = fps;
    }
    config.validate()?;

    init_logging(&config)?;

    let content = match &cli.content {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            serde_json::from_str(&json)?
        }
        None => SiteContent::default(),
    };

    match cli.command {
        Some(Commands::Run) | None => {
            commands::run::run(config, content, host_prefers_reduced()).await
        }
        Some(Commands::Loader) => {
            commands::loader::run(config, host_prefers_reduced()).await
        }
        Some(Commands::Config { save }) => commands::config::run(&config, save),
        Some(Commands::Content) => commands::config::print_content(&content),
    }
}

/// Log to a file under the data dir; the terminal belongs to the UI
fn init_logging(config: &ChoreoConfig) -> Result<()> {
    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn host_prefers_reduced() -> bool {
    std::env::var(REDUCED_MOTION_ENV)
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "reduce"))
        .unwrap_or(false)
}
