use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use tracing::{debug, info};

use crate::device::{Clock, Color, Devices, Font, InputEvent, InputSource, Key, Surface};
use crate::leaderboard::{Leaderboard, ScoreEntry, DEFAULT_TOP};
use crate::session::{Field, GameSession, SessionOutcome};

pub const NAME_MAX_LEN: usize = 15;

const MENU_FPS: u32 = 30;
const GAME_OVER_DURATION: Duration = Duration::from_secs(5);

/// Either carry on to the next screen, or unwind everything and exit.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow<T> {
    Next(T),
    Quit,
}

#[derive(Debug, Default)]
pub struct NameInput {
    name: String,
}

impl NameInput {
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Feeds one event. Returns true when Enter confirms a non-empty name.
    pub fn feed(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::KeyDown(Key::Enter) => !self.name.is_empty(),
            InputEvent::KeyDown(Key::Backspace) => {
                self.name.pop();
                false
            }
            InputEvent::Text(ch) if !ch.is_control() && self.name.chars().count() < NAME_MAX_LEN => {
                self.name.push(ch);
                false
            }
            _ => false,
        }
    }

    pub fn into_name(self) -> String {
        self.name
    }
}

/// Drives the screens: name entry, wait for a key, play, game over, and
/// around again until the player quits.
pub struct SnakeGame<S, I, C, R> {
    devices: Devices<S, I, C>,
    leaderboard: Leaderboard,
    field: Field,
    tick_rate: u32,
    rng: R,
}

impl<S, I, C, R> SnakeGame<S, I, C, R>
where
    S: Surface,
    I: InputSource,
    C: Clock,
    R: Rng,
{
    pub fn new(devices: Devices<S, I, C>, leaderboard: Leaderboard, field: Field, tick_rate: u32, rng: R) -> Self {
        SnakeGame { devices, leaderboard, field, tick_rate, rng }
    }

    #[cfg(test)]
    pub(crate) fn devices(&self) -> &Devices<S, I, C> {
        &self.devices
    }

    pub fn run(&mut self) -> Result<()> {
        self.leaderboard.initialize().context("Error preparing the leaderboard")?;

        loop {
            if let Flow::Quit = self.play_round()? {
                info!("player quit");
                return Ok(());
            }
        }
    }

    /// One lap of the screens, from name entry to the end of game over.
    pub fn play_round(&mut self) -> Result<Flow<()>> {
        let board = self.leaderboard.top(DEFAULT_TOP).context("Error reading the leaderboard")?;

        let name = match self.name_entry(&board)? {
            Flow::Next(name) => name,
            Flow::Quit => return Ok(Flow::Quit),
        };

        if let Flow::Quit = self.await_start(&board)? {
            return Ok(Flow::Quit);
        }

        let session = GameSession::new(self.field, &mut self.rng);
        let score = match session.run(&name, &mut self.devices, &mut self.rng, self.tick_rate)? {
            SessionOutcome::Lost { score } => score,
            SessionOutcome::Quit => return Ok(Flow::Quit),
        };

        if score > 0 {
            self.leaderboard.record(&name, score).context("Error saving the score")?;
        }

        self.game_over(&name, score)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn name_entry(&mut self, board: &[ScoreEntry]) -> Result<Flow<String>> {
        let mut input = NameInput::default();
        debug!("name entry");

        loop {
            for event in self.devices.input.poll_events()? {
                if event == InputEvent::Quit {
                    return Ok(Flow::Quit);
                }

                if input.feed(event) {
                    let name = input.into_name();
                    info!(name = name.as_str(), "name confirmed");
                    return Ok(Flow::Next(name));
                }
            }

            let surface = &mut self.devices.surface;
            surface.clear(Color::Black);
            draw_leaderboard(surface, board, self.field);
            surface.text((20, 200), "Type your name and press ENTER:", Color::White, Font::Instruction);
            surface.text((20, 250), input.as_str(), Color::LightBlue, Font::Title);
            surface.present()?;

            self.devices.clock.tick(MENU_FPS);
        }
    }

    fn await_start(&mut self, board: &[ScoreEntry]) -> Result<Flow<()>> {
        loop {
            for event in self.devices.input.poll_events()? {
                match event {
                    InputEvent::Quit => return Ok(Flow::Quit),
                    InputEvent::KeyDown(_) => return Ok(Flow::Next(())),
                    InputEvent::Text(_) => {}
                }
            }

            let surface = &mut self.devices.surface;
            surface.clear(Color::Black);
            draw_leaderboard(surface, board, self.field);
            surface.text((20, 200), "Press any key to start!", Color::White, Font::Instruction);
            surface.fill_rect((150, 300), (150, 50), Color::Green);
            surface.text_centered((225, 325), "START", Color::Black, Font::Title);
            surface.present()?;

            self.devices.clock.tick(MENU_FPS);
        }
    }

    fn game_over(&mut self, name: &str, score: u32) -> Result<Flow<()>> {
        let started = self.devices.clock.now();
        let (mid_x, mid_y) = (self.field.width / 2, self.field.height / 2);
        let summary = format!("{}, your score: {}", name, score);

        while self.devices.clock.now().saturating_sub(started) < GAME_OVER_DURATION {
            if self.devices.input.poll_events()?.contains(&InputEvent::Quit) {
                return Ok(Flow::Quit);
            }

            let surface = &mut self.devices.surface;
            surface.clear(Color::Black);
            surface.text_centered((mid_x, mid_y - 50), "GAME OVER", Color::Red, Font::Title);
            surface.text_centered((mid_x, mid_y + 20), &summary, Color::White, Font::Instruction);
            surface.present()?;

            self.devices.clock.tick(MENU_FPS);
        }

        Ok(Flow::Next(()))
    }
}

fn draw_leaderboard<S: Surface>(surface: &mut S, board: &[ScoreEntry], field: Field) {
    let divider_x = field.width * 9 / 16;
    let column_x = divider_x + 20;

    surface.fill_rect((divider_x, 20), (2, field.height - 40), Color::LightBlue);
    surface.text((column_x, 40), "Top 10:", Color::Yellow, Font::Title);

    for (rank, entry) in board.iter().enumerate() {
        let y = 100 + 35 * rank as i32;
        let line = format!("{}. {} - {} pts", rank + 1, entry.name, entry.points);
        surface.text((column_x, y), &line, Color::White, Font::Score);
    }
}
