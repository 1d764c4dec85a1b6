//! Scripted stand-ins for the terminal and the wall clock.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crate::Coords;
use crate::device::{Clock, Color, Font, InputEvent, InputSource, Surface};

/// Hands out one scripted batch per poll. Once the script runs dry every poll
/// returns a quit, so a test can never spin forever.
pub struct ScriptedInput {
    batches: VecDeque<Vec<InputEvent>>,
    pub polls: usize,
}

impl ScriptedInput {
    pub fn new(batches: Vec<Vec<InputEvent>>) -> Self {
        ScriptedInput { batches: batches.into(), polls: 0 }
    }

    pub fn idle(mut self, n: usize) -> Self {
        self.batches.extend(std::iter::repeat_with(Vec::new).take(n));
        self
    }

    pub fn then(mut self, batch: Vec<InputEvent>) -> Self {
        self.batches.push_back(batch);
        self
    }
}

impl InputSource for ScriptedInput {
    fn poll_events(&mut self) -> io::Result<Vec<InputEvent>> {
        self.polls += 1;
        Ok(self.batches.pop_front().unwrap_or_else(|| vec![InputEvent::Quit]))
    }
}

#[derive(Default)]
pub struct RecordingSurface {
    pub frames: usize,
    pub rects: Vec<(Coords, Coords, Color)>,
    pub texts: Vec<String>,
    pub presented_texts: Vec<String>,
}

impl RecordingSurface {
    pub fn last_frame_has(&self, text: &str) -> bool {
        self.presented_texts.iter().any(|t| t == text)
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, _color: Color) {
        self.rects.clear();
        self.texts.clear();
    }

    fn fill_rect(&mut self, pos: Coords, size: Coords, color: Color) {
        self.rects.push((pos, size, color));
    }

    fn text(&mut self, _pos: Coords, text: &str, _color: Color, _font: Font) {
        self.texts.push(text.to_string());
    }

    fn text_centered(&mut self, _center: Coords, text: &str, _color: Color, _font: Font) {
        self.texts.push(text.to_string());
    }

    fn present(&mut self) -> io::Result<()> {
        self.frames += 1;
        self.presented_texts = self.texts.clone();
        Ok(())
    }
}

/// Advances exactly one frame per tick and never sleeps.
#[derive(Default)]
pub struct ManualClock {
    now: Duration,
}

impl Clock for ManualClock {
    fn tick(&mut self, fps: u32) {
        self.now += Duration::from_secs(1) / fps.max(1);
    }

    fn now(&self) -> Duration {
        self.now
    }
}
