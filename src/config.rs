use std::env;
use std::fs::File;
use std::path::PathBuf;

use thiserror::Error;

use crate::quiz::{BankError, QuestionBank};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot open question bank {path}: {source}")]
    OpenBank {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("question bank {path}: {source}")]
    Bank { path: PathBuf, source: BankError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file holding dialogue state.
    pub db_path: PathBuf,
    pub leaderboard_path: PathBuf,
    /// Custom quiz questions; the built-in bank is used when unset.
    pub quiz_bank_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("db.sqlite"),
            leaderboard_path: PathBuf::from("leaderboard.json"),
            quiz_bank_path: None,
        }
    }
}

impl Config {
    /// Reads `DEMOS_DB_PATH`, `LEADERBOARD_PATH` and `QUIZ_BANK_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            db_path: non_empty("DEMOS_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            leaderboard_path: non_empty("LEADERBOARD_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.leaderboard_path),
            quiz_bank_path: non_empty("QUIZ_BANK_PATH").map(PathBuf::from),
        }
    }

    pub fn load_question_bank(&self) -> Result<QuestionBank, ConfigError> {
        let Some(path) = &self.quiz_bank_path else {
            return Ok(QuestionBank::default());
        };
        let file = File::open(path).map_err(|source| ConfigError::OpenBank {
            path: path.clone(),
            source,
        })?;
        QuestionBank::from_reader(file).map_err(|source| ConfigError::Bank {
            path: path.clone(),
            source,
        })
    }
}
