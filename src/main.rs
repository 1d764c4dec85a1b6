use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use snake_scores::clock::FrameClock;
use snake_scores::config::Settings;
use snake_scores::device::Devices;
use snake_scores::game::SnakeGame;
use snake_scores::leaderboard::Leaderboard;
use snake_scores::term::{RawScreen, TermInput, TermSurface};

fn main() -> Result<()> {
    let settings = Settings::parse();
    settings.validate()?;
    init_logging(&settings.log_file)?;
    info!(?settings, "starting");

    let field = settings.field();
    let surface = TermSurface::new(field)?;
    let devices = Devices::new(surface, TermInput, FrameClock::new());
    let leaderboard = Leaderboard::new(&settings.scores_file);
    let mut game = SnakeGame::new(devices, leaderboard, field, settings.tick_rate, StdRng::from_entropy());

    // The screen is restored when the guard drops, before any error is printed.
    let screen = RawScreen::enter().context("Error setting up the terminal")?;
    let res = game.run();
    drop(screen);

    if let Err(err) = &res {
        error!("{:#}", err);
    }
    info!("bye");
    res
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to open log file {:?}", path))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
