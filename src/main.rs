use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Env, Target};
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};
use tick_snake::game::GameConfig;
use tick_snake::modes::HumanMode;
use tick_snake::storage::JsonFileStore;

#[derive(Parser)]
#[command(name = "tick_snake")]
#[command(version, about = "Snake in the terminal")]
struct Cli {
    /// JSON file with a full or partial game configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// Milliseconds between game ticks
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Where the high score is kept between runs
    #[arg(long, default_value = "snake_high_score.json")]
    high_score_file: PathBuf,

    /// Write logs to this file (the terminal is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Config file values, overridden by explicit flags
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)?,
            None => GameConfig::default(),
        };

        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_interval_ms = tick_ms;
        }

        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file.as_deref())?;
    let config = cli.game_config()?;

    info!(
        "Starting {}x{} board, tick {}ms, high score file {:?}",
        config.grid_width, config.grid_height, config.tick_interval_ms, cli.high_score_file
    );

    let store = JsonFileStore::new(&cli.high_score_file);
    let mut human_mode = HumanMode::new(config, store);
    human_mode.run().await?;

    Ok(())
}
