use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::Parser;

use crate::session::Field;
use crate::TermInt;

// Leaves room for the snake to step a cell or two past the edge.
const MAX_FIELD_PIXELS: i32 = i32::MAX / 4;

#[derive(Parser, Debug, Clone)]
#[command(name = "snake-scores", version, about = "Snake in the terminal, with a leaderboard that remembers")]
pub struct Settings {
    /// Field width in logical pixels
    #[arg(long, default_value_t = 800)]
    pub width: i32,

    /// Field height in logical pixels
    #[arg(long, default_value_t = 600)]
    pub height: i32,

    /// Size of one grid cell in logical pixels
    #[arg(long, default_value_t = 20)]
    pub cell_size: i32,

    /// Game ticks per second
    #[arg(long, default_value_t = 15)]
    pub tick_rate: u32,

    /// Where the leaderboard is kept
    #[arg(long, default_value = "scores.json")]
    pub scores_file: PathBuf,

    /// Where logs are written (the terminal is busy drawing the game)
    #[arg(long, default_value = "snake.log")]
    pub log_file: PathBuf,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.cell_size > 0, "cell size must be positive, got {}", self.cell_size);
        ensure!(
            self.width % self.cell_size == 0 && self.height % self.cell_size == 0,
            "field {}x{} is not a whole number of {}-pixel cells",
            self.width,
            self.height,
            self.cell_size
        );
        ensure!(
            self.width >= 2 * self.cell_size && self.height >= 2 * self.cell_size,
            "field {}x{} is smaller than 2x2 cells",
            self.width,
            self.height
        );
        ensure!(
            self.width <= MAX_FIELD_PIXELS && self.height <= MAX_FIELD_PIXELS,
            "field {}x{} is larger than {} pixels on a side",
            self.width,
            self.height,
            MAX_FIELD_PIXELS
        );
        ensure!(
            self.width / self.cell_size * 2 <= i32::from(TermInt::MAX)
                && self.height / self.cell_size <= i32::from(TermInt::MAX),
            "field {}x{} needs more terminal cells than a terminal can have",
            self.width,
            self.height
        );
        ensure!(self.tick_rate > 0, "tick rate must be at least 1");
        Ok(())
    }

    pub fn field(&self) -> Field {
        Field { width: self.width, height: self.height, cell_size: self.cell_size }
    }
}
