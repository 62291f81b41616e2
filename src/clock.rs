use crate::types::Color;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CLASSIC_SECONDS: u64 = 30 * 60;
const RAPID_SECONDS: u64 = 10 * 60;
const BLITZ_SECONDS: u64 = 3 * 60;

/// Time control a game is played under.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Classic,
    Rapid,
    Blitz,
}

impl GameMode {
    pub fn initial_time(&self) -> Duration {
        Duration::from_secs(match self {
            GameMode::Classic => CLASSIC_SECONDS,
            GameMode::Rapid => RAPID_SECONDS,
            GameMode::Blitz => BLITZ_SECONDS,
        })
    }

    pub fn parse(name: &str) -> Option<GameMode> {
        match name.to_ascii_lowercase().as_str() {
            "classic" => Some(GameMode::Classic),
            "rapid" => Some(GameMode::Rapid),
            "blitz" => Some(GameMode::Blitz),
            _ => None,
        }
    }
}

/// Remaining thinking time per side. The engine never reads the wall clock; elapsed time is
/// fed in by whoever drives the game.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    white_remaining: Duration,
    black_remaining: Duration,
}

impl Clock {
    pub fn new(mode: GameMode) -> Self {
        let initial = mode.initial_time();
        Clock { white_remaining: initial, black_remaining: initial }
    }

    pub fn remaining(&self, color: Color) -> Duration {
        match color { Color::White => self.white_remaining, Color::Black => self.black_remaining }
    }

    /// Charges `elapsed` to `color`, never going below zero. Returns true when that side's
    /// time has run out.
    pub fn charge(&mut self, color: Color, elapsed: Duration) -> bool {
        let slot = match color { Color::White => &mut self.white_remaining, Color::Black => &mut self.black_remaining };
        *slot = slot.saturating_sub(elapsed);
        slot.is_zero()
    }
}

/// Formats a duration as `mm:ss`.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
