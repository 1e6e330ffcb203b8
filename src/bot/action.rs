use std::fmt;
use std::str::FromStr;

use crate::memory::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demo {
    Sort,
    Quiz,
    Memory,
}

impl Demo {
    fn as_str(self) -> &'static str {
        match self {
            Demo::Sort => "sort",
            Demo::Quiz => "quiz",
            Demo::Memory => "memory",
        }
    }
}

/// A button press, carried in the callback data of inline keyboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Disabled buttons and face-up cards.
    Noop,
    MainMenu,
    Open(Demo),
    SortStep,
    QuizStart,
    QuizOption(usize),
    QuizNext,
    QuizReview,
    QuizRestart,
    MemoryStart(Difficulty),
    MemoryCard(usize),
    MemoryRestart,
    MemoryAgain,
    MemoryHome,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Noop => f.write_str("noop"),
            Action::MainMenu => f.write_str("menu"),
            Action::Open(demo) => write!(f, "menu:{}", demo.as_str()),
            Action::SortStep => f.write_str("sort:step"),
            Action::QuizStart => f.write_str("quiz:start"),
            Action::QuizOption(idx) => write!(f, "quiz:opt:{}", idx),
            Action::QuizNext => f.write_str("quiz:next"),
            Action::QuizReview => f.write_str("quiz:review"),
            Action::QuizRestart => f.write_str("quiz:restart"),
            Action::MemoryStart(difficulty) => write!(f, "mem:start:{}", difficulty),
            Action::MemoryCard(idx) => write!(f, "mem:card:{}", idx),
            Action::MemoryRestart => f.write_str("mem:restart"),
            Action::MemoryAgain => f.write_str("mem:again"),
            Action::MemoryHome => f.write_str("mem:home"),
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = data.split(':').collect();
        let index = |raw: &str| {
            raw.parse::<usize>()
                .map_err(|_| format!("bad index in callback '{}'", data))
        };
        let action = match parts.as_slice() {
            ["noop"] => Action::Noop,
            ["menu"] => Action::MainMenu,
            ["menu", "sort"] => Action::Open(Demo::Sort),
            ["menu", "quiz"] => Action::Open(Demo::Quiz),
            ["menu", "memory"] => Action::Open(Demo::Memory),
            ["sort", "step"] => Action::SortStep,
            ["quiz", "start"] => Action::QuizStart,
            ["quiz", "opt", idx] => Action::QuizOption(index(*idx)?),
            ["quiz", "next"] => Action::QuizNext,
            ["quiz", "review"] => Action::QuizReview,
            ["quiz", "restart"] => Action::QuizRestart,
            ["mem", "start", difficulty] => Action::MemoryStart(difficulty.parse()?),
            ["mem", "card", idx] => Action::MemoryCard(index(*idx)?),
            ["mem", "restart"] => Action::MemoryRestart,
            ["mem", "again"] => Action::MemoryAgain,
            ["mem", "home"] => Action::MemoryHome,
            _ => return Err(format!("unknown callback '{}'", data)),
        };
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_parses_back() {
        let actions = [
            Action::Noop,
            Action::MainMenu,
            Action::Open(Demo::Sort),
            Action::Open(Demo::Quiz),
            Action::Open(Demo::Memory),
            Action::SortStep,
            Action::QuizStart,
            Action::QuizOption(3),
            Action::QuizNext,
            Action::QuizReview,
            Action::QuizRestart,
            Action::MemoryStart(Difficulty::Hard),
            Action::MemoryCard(15),
            Action::MemoryRestart,
            Action::MemoryAgain,
            Action::MemoryHome,
        ];
        for action in actions {
            assert_eq!(action.to_string().parse::<Action>(), Ok(action));
        }
    }

    #[test]
    fn callback_data_fits_telegram_limit() {
        // Telegram caps callback data at 64 bytes
        assert!(Action::MemoryStart(Difficulty::Easy).to_string().len() <= 64);
        assert!(Action::MemoryCard(usize::MAX).to_string().len() <= 64);
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<Action>().is_err());
        assert!("quiz:opt:x".parse::<Action>().is_err());
        assert!("mem:start:medium".parse::<Action>().is_err());
        assert!("sort:step:extra".parse::<Action>().is_err());
    }
}
