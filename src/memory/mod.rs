use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub mod deck;
pub mod game;
pub mod leaderboard;

pub use deck::{Card, Side};
pub use game::{Flip, GameResult, MemoryGame};

/// Points for every matched pair.
pub const MATCH_POINTS: u32 = 10;
/// Finishing under this many seconds earns the difference as a bonus.
pub const TIME_BONUS_SECS: u64 = 60;
/// How long a mismatched pair stays face up.
pub const MISMATCH_DELAY: Duration = Duration::from_secs(1);
/// Pause between the last match and the result screen.
pub const RESULT_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 2] = [Difficulty::Easy, Difficulty::Hard];

    pub fn pairs(self) -> usize {
        match self {
            Difficulty::Easy => 6,
            Difficulty::Hard => 8,
        }
    }

    /// Cards per row on the board.
    pub fn columns(self) -> usize {
        4
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// `max(0, 60 - elapsed)`.
pub fn time_bonus(elapsed: u64) -> u32 {
    TIME_BONUS_SECS.saturating_sub(elapsed) as u32
}
