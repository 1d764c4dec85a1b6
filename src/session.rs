use std::io;
use std::ops::ControlFlow;

use rand::Rng;
use tracing::{debug, info};

use crate::Coords;
use crate::device::{Clock, Color, Devices, Font, InputEvent, InputSource, Key, Surface};
use crate::snake::{Direction, Snake};

pub const POINTS_PER_FOOD: u32 = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    Lost { score: u32 },
    Quit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Lost,
}

/// The playing field in logical pixels, cut into square cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub width: i32,
    pub height: i32,
    pub cell_size: i32,
}

impl Field {
    pub fn contains(&self, (x, y): Coords) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// The centre of the field, snapped down onto the grid.
    pub fn centre(&self) -> Coords {
        let snap = |v: i32| v / self.cell_size * self.cell_size;
        (snap(self.width / 2), snap(self.height / 2))
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Coords {
        let cols = self.width / self.cell_size;
        let rows = self.height / self.cell_size;
        (rng.gen_range(0..cols) * self.cell_size, rng.gen_range(0..rows) * self.cell_size)
    }
}

/// One play-through: a snake chasing food until it leaves the field, bites
/// itself or the player quits.
pub struct GameSession {
    field: Field,
    snake: Snake,
    food: Coords,
    score: u32,
    status: Status,
}

impl GameSession {
    pub fn new<R: Rng + ?Sized>(field: Field, rng: &mut R) -> Self {
        GameSession {
            field,
            snake: Snake::new(field.centre()),
            food: field.random_cell(rng),
            score: 0,
            status: Status::Running,
        }
    }

    /// Runs ticks at `tick_rate` per second until the session ends.
    pub fn run<S, I, C, R>(
        mut self,
        player: &str,
        devices: &mut Devices<S, I, C>,
        rng: &mut R,
        tick_rate: u32,
    ) -> io::Result<SessionOutcome>
    where
        S: Surface,
        I: InputSource,
        C: Clock,
        R: Rng + ?Sized,
    {
        info!(player, "session started");

        loop {
            let events = devices.input.poll_events()?;
            if self.handle_input(&events).is_break() {
                info!(player, score = self.score, "session quit");
                return Ok(SessionOutcome::Quit);
            }

            self.step();
            self.draw(&mut devices.surface, player)?;
            self.consume_food(rng);

            if self.status == Status::Lost {
                info!(player, score = self.score, length = self.snake.body().len(), "session lost");
                return Ok(SessionOutcome::Lost { score: self.score });
            }

            devices.clock.tick(tick_rate);
        }
    }

    /// Applies one tick's worth of events in order. Breaks on quit, leaving
    /// the remaining events untouched.
    pub fn handle_input(&mut self, events: &[InputEvent]) -> ControlFlow<()> {
        for event in events {
            let dir = match event {
                InputEvent::Quit => return ControlFlow::Break(()),
                InputEvent::KeyDown(Key::Up) => Direction::Up,
                InputEvent::KeyDown(Key::Down) => Direction::Down,
                InputEvent::KeyDown(Key::Left) => Direction::Left,
                InputEvent::KeyDown(Key::Right) => Direction::Right,
                _ => continue,
            };

            self.snake.steer(dir);
        }

        ControlFlow::Continue(())
    }

    /// Boundary check, move, self-collision check.
    ///
    /// The boundary test looks at the head as it was before this move, so a
    /// snake that leaves the field is caught on the following tick.
    pub fn step(&mut self) {
        if !self.field.contains(self.snake.head()) {
            self.status = Status::Lost;
        }

        self.snake.advance(self.field.cell_size);

        if self.snake.bites_itself() {
            self.status = Status::Lost;
        }
    }

    /// Eats the food if the head is on it. Food respawns anywhere on the grid,
    /// the snake's own cells included.
    pub fn consume_food<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.snake.head() != self.food {
            return false;
        }

        self.food = self.field.random_cell(rng);
        self.snake.grow();
        self.score += POINTS_PER_FOOD;
        debug!(score = self.score, food = ?self.food, "food eaten");

        true
    }

    pub fn draw<S: Surface>(&self, surface: &mut S, player: &str) -> io::Result<()> {
        let cell = (self.field.cell_size, self.field.cell_size);

        surface.clear(Color::Black);
        surface.fill_rect(self.food, cell, Color::Red);
        for pos in self.snake.body() {
            surface.fill_rect(*pos, cell, Color::Green);
        }
        surface.text((10, 10), &format!("{} | Score: {}", player, self.score), Color::White, Font::Score);

        surface.present()
    }

    #[cfg(test)]
    pub(crate) fn place_food(&mut self, pos: Coords) {
        self.food = pos;
    }

    #[cfg(test)]
    pub(crate) fn snake(&self) -> &Snake {
        &self.snake
    }

    #[cfg(test)]
    pub(crate) fn food(&self) -> Coords {
        self.food
    }

    #[cfg(test)]
    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    #[cfg(test)]
    pub(crate) fn status(&self) -> Status {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, RecordingSurface, ScriptedInput};
    use rand::{rngs::mock::StepRng, rngs::StdRng, SeedableRng};

    fn field(cols: i32, rows: i32) -> Field {
        Field { width: cols * 20, height: rows * 20, cell_size: 20 }
    }

    fn key(k: Key) -> InputEvent {
        InputEvent::KeyDown(k)
    }

    #[test]
    fn starts_at_the_centre_with_nothing_scored() {
        let session = GameSession::new(field(40, 30), &mut StepRng::new(0, 0));

        assert_eq!(session.snake().head(), (400, 300));
        assert_eq!(session.food(), (0, 0));
        assert_eq!(session.score(), 0);
        assert_eq!(session.status(), Status::Running);
    }

    #[test]
    fn food_is_always_on_the_grid_and_in_bounds() {
        let field = Field { width: 800, height: 600, cell_size: 20 };
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            let (x, y) = field.random_cell(&mut rng);
            assert_eq!(x % 20, 0);
            assert_eq!(y % 20, 0);
            assert!(field.contains((x, y)));
        }
    }

    #[test]
    fn last_accepted_direction_wins() {
        let mut session = GameSession::new(field(10, 10), &mut StepRng::new(0, 0));
        let _ = session.handle_input(&[key(Key::Up), key(Key::Left)]);
        assert_eq!(session.snake().heading(), Some(Direction::Left));

        let mut session = GameSession::new(field(10, 10), &mut StepRng::new(0, 0));
        let _ = session.handle_input(&[key(Key::Right), key(Key::Left)]);
        assert_eq!(session.snake().heading(), Some(Direction::Right));
    }

    #[test]
    fn horizontal_keys_do_nothing_while_moving_horizontally() {
        let mut session = GameSession::new(field(10, 10), &mut StepRng::new(0, 0));
        let _ = session.handle_input(&[key(Key::Left)]);
        session.step();

        let _ = session.handle_input(&[key(Key::Right), key(Key::Left), key(Key::Char('a'))]);
        assert_eq!(session.snake().heading(), Some(Direction::Left));
    }

    #[test]
    fn quit_breaks_before_later_events() {
        let mut session = GameSession::new(field(10, 10), &mut StepRng::new(0, 0));
        let flow = session.handle_input(&[InputEvent::Quit, key(Key::Up)]);

        assert!(flow.is_break());
        assert_eq!(session.snake().heading(), None);
    }

    #[test]
    fn leaving_the_field_is_caught_one_tick_late() {
        let mut session = GameSession::new(field(3, 3), &mut StepRng::new(0, 0));
        assert_eq!(session.snake().head(), (20, 20));
        let _ = session.handle_input(&[key(Key::Right)]);

        session.step();
        assert_eq!(session.snake().head(), (40, 20));
        assert_eq!(session.status(), Status::Running);

        session.step();
        assert_eq!(session.snake().head(), (60, 20));
        assert_eq!(session.status(), Status::Running);

        session.step();
        assert_eq!(session.status(), Status::Lost);
    }

    #[test]
    fn eating_scores_ten_and_grows_by_one() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = GameSession::new(field(20, 20), &mut rng);
        let _ = session.handle_input(&[key(Key::Down)]);

        for _ in 0..3 {
            session.step();
            let head = session.snake().head();
            session.place_food(head);

            let (score, target) = (session.score(), session.snake().growth_target());
            assert!(session.consume_food(&mut rng));
            assert_eq!(session.score(), score + POINTS_PER_FOOD);
            assert_eq!(session.snake().growth_target(), target + 1);
        }

        assert!(session.snake().body().len() <= session.snake().growth_target());
    }

    #[test]
    fn missing_the_food_changes_nothing() {
        let mut session = GameSession::new(field(20, 20), &mut StepRng::new(0, 0));
        session.step();

        assert!(!session.consume_food(&mut StepRng::new(0, 0)));
        assert_eq!(session.score(), 0);
        assert_eq!(session.snake().growth_target(), 1);
    }

    #[test]
    fn food_spawned_under_a_still_snake_ends_the_game() {
        let mut rng = StepRng::new(0, 0);
        let mut session = GameSession::new(field(5, 5), &mut rng);
        session.place_food(session.snake().head());

        session.step();
        assert!(session.consume_food(&mut rng));
        assert_eq!(session.status(), Status::Running);

        session.step();
        assert_eq!(session.status(), Status::Lost);
    }

    #[test]
    fn run_reports_the_final_score() {
        // Food always respawns at the origin.
        let mut rng = StepRng::new(0, 0);
        let session = GameSession::new(field(5, 5), &mut rng);
        let mut devices = Devices::new(
            RecordingSurface::default(),
            ScriptedInput::new(vec![
                vec![key(Key::Left)],
                vec![],
                vec![key(Key::Up)],
                vec![],
                vec![],
                vec![],
            ]),
            ManualClock::default(),
        );

        let outcome = session.run("ann", &mut devices, &mut rng, 15).unwrap();

        assert_eq!(outcome, SessionOutcome::Lost { score: 10 });
        assert_eq!(devices.surface.frames, 6);
        assert!(devices.surface.last_frame_has("ann | Score: 10"));
    }

    #[test]
    fn food_eaten_on_the_losing_tick_still_counts() {
        let mut rng = StepRng::new(0, 0);
        let mut session = GameSession::new(field(5, 5), &mut rng);
        // Where the head lands on the tick the boundary check catches it.
        session.place_food((-40, 40));
        let mut devices = Devices::new(
            RecordingSurface::default(),
            ScriptedInput::new(vec![vec![key(Key::Left)], vec![], vec![], vec![]]),
            ManualClock::default(),
        );

        let outcome = session.run("ann", &mut devices, &mut rng, 15).unwrap();

        assert_eq!(outcome, SessionOutcome::Lost { score: POINTS_PER_FOOD });
        assert_eq!(devices.surface.frames, 4);
    }

    #[test]
    fn run_stops_on_quit() {
        let mut rng = StepRng::new(0, 0);
        let session = GameSession::new(field(5, 5), &mut rng);
        let mut devices = Devices::new(
            RecordingSurface::default(),
            ScriptedInput::new(vec![vec![key(Key::Left)], vec![InputEvent::Quit]]),
            ManualClock::default(),
        );

        let outcome = session.run("ann", &mut devices, &mut rng, 15).unwrap();

        assert_eq!(outcome, SessionOutcome::Quit);
        assert_eq!(devices.surface.frames, 1);
    }
}
