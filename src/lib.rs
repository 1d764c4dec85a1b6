pub mod clock;
pub mod config;
pub mod device;
pub mod game;
pub mod leaderboard;
pub mod session;
pub mod snake;
pub mod term;
#[cfg(test)]
mod testing;

pub type TermInt = u16;
pub type Coords = (i32, i32);
