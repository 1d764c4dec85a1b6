use crate::Coords;
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Direction {
    pub fn axis(self) -> Axis {
        match self {
            Left | Right => Axis::Horizontal,
            Up | Down => Axis::Vertical,
        }
    }

    /// Unit step, in cells.
    pub fn delta(self) -> Coords {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }
}

/// The snake's body, oldest segment first and head last. It never holds more
/// segments than its growth target.
pub struct Snake {
    body: Vec<Coords>,
    head: Coords,
    heading: Option<Direction>,
    growth_target: usize,
}

impl Snake {
    /// A one-segment snake sitting still at `pos`.
    pub fn new(pos: Coords) -> Self {
        Snake { body: vec![pos], head: pos, heading: None, growth_target: 1 }
    }

    pub fn body(&self) -> &[Coords] {
        &self.body
    }

    pub fn head(&self) -> Coords {
        self.head
    }

    #[cfg(test)]
    pub(crate) fn heading(&self) -> Option<Direction> {
        self.heading
    }

    #[cfg(test)]
    pub(crate) fn growth_target(&self) -> usize {
        self.growth_target
    }

    /// Turns the snake, unless it is already moving along the axis of
    /// `new_direction`. Returns whether the turn was taken.
    pub fn steer(&mut self, new_direction: Direction) -> bool {
        match self.heading {
            Some(current) if current.axis() == new_direction.axis() => false,
            _ => {
                self.heading = Some(new_direction);
                true
            }
        }
    }

    /// Moves the head one cell along the heading (or not at all while still)
    /// and trims the tail down to the growth target. Returns the new head.
    pub fn advance(&mut self, cell_size: i32) -> Coords {
        let (dx, dy) = self.heading.map_or((0, 0), Direction::delta);
        self.head = (self.head.0 + dx * cell_size, self.head.1 + dy * cell_size);
        self.body.push(self.head);

        if self.body.len() > self.growth_target {
            let excess = self.body.len() - self.growth_target;
            self.body.drain(0..excess);
        }

        self.head
    }

    pub fn bites_itself(&self) -> bool {
        let (_, rest) = match self.body.split_last() {
            Some(split) => split,
            None => return false,
        };

        rest.contains(&self.head)
    }

    pub fn grow(&mut self) {
        self.growth_target += 1;
    }
}
