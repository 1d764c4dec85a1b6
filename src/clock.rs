use std::{thread::sleep, time::{Duration, Instant}};

use crate::device::Clock;

/// Real-time frame pacing: `tick` sleeps for whatever is left of the frame
/// since the previous `tick`.
pub struct FrameClock {
    started: Instant,
    last_tick: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        FrameClock { started: now, last_tick: now }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FrameClock {
    fn tick(&mut self, fps: u32) {
        let frame = Duration::from_secs(1) / fps.max(1);
        let spent = self.last_tick.elapsed();

        if let Some(remaining) = frame.checked_sub(spent) {
            sleep(remaining);
        }

        self.last_tick = Instant::now();
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }
}
