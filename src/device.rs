//! The capabilities the game consumes: somewhere to draw, somewhere to read
//! input from and a frame clock. The screens and the game session only ever
//! talk to these traits, so the terminal backend can be swapped for fakes.

use std::io;
use std::time::Duration;

use crate::Coords;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
    Green,
    Red,
    LightBlue,
    Yellow,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Font {
    Title,
    Instruction,
    Score,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Backspace,
    Char(char),
    /// Any other key the backend recognises (Tab, Esc, function keys...).
    Other,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
    Text(char),
}

/// Primitive drawing in logical pixel coordinates. Nothing becomes visible
/// until `present` is called.
pub trait Surface {
    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, pos: Coords, size: Coords, color: Color);

    fn text(&mut self, pos: Coords, text: &str, color: Color, font: Font);

    fn text_centered(&mut self, center: Coords, text: &str, color: Color, font: Font);

    fn present(&mut self) -> io::Result<()>;
}

pub trait InputSource {
    /// Returns every event that is pending right now. Never blocks.
    fn poll_events(&mut self) -> io::Result<Vec<InputEvent>>;
}

pub trait Clock {
    /// Waits out whatever is left of the current frame at `fps` frames per second.
    fn tick(&mut self, fps: u32);

    fn now(&self) -> Duration;
}

pub struct Devices<S, I, C> {
    pub surface: S,
    pub input: I,
    pub clock: C,
}

impl<S: Surface, I: InputSource, C: Clock> Devices<S, I, C> {
    pub fn new(surface: S, input: I, clock: C) -> Self {
        Devices { surface, input, clock }
    }
}
