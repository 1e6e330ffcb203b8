use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use super::Difficulty;

/// Entries kept per difficulty.
pub const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScoreRecord {
    pub score: u32,
    pub date: String,
    pub moves: u32,
    /// `mm:ss`
    pub time: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("leaderboard file: {0}")]
    Io(#[from] io::Error),
    #[error("leaderboard encoding: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key-value storage, the shape of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Keeps every key in one JSON object on disk, rewritten on each `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store. A missing or unreadable file starts it empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|err| {
                log::warn!("ignoring corrupt leaderboard {}: {}", path.display(), err);
                BTreeMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                log::warn!("cannot read leaderboard {}: {}", path.display(), err);
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        let json = serde_json::to_string_pretty(&self.entries)?;
        // written beside the target and renamed over it, so a crash leaves
        // either the old file or the new one
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

pub fn key(difficulty: Difficulty) -> String {
    format!("memory-game-highscores-{}", difficulty)
}

/// Scores for a difficulty, best first. Absent or unparsable data reads as
/// an empty board.
pub fn load<S: KeyValueStore + ?Sized>(store: &S, difficulty: Difficulty) -> Vec<ScoreRecord> {
    let Some(raw) = store.get(&key(difficulty)) else {
        return Vec::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        log::warn!("discarding unreadable {} leaderboard: {}", difficulty, err);
        Vec::new()
    })
}

/// Adds a result and keeps the best five. Returns whether it beats the
/// previous best.
pub fn submit<S: KeyValueStore + ?Sized>(
    store: &mut S,
    difficulty: Difficulty,
    record: ScoreRecord,
) -> bool {
    let mut scores = load(store, difficulty);
    let best = scores.first().map_or(0, |top| top.score);
    let is_record = record.score > best;

    scores.push(record);
    // stable, so an equal score ranks below the older entry
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    scores.truncate(TOP_N);

    match serde_json::to_string(&scores) {
        Ok(json) => {
            if let Err(err) = store.set(&key(difficulty), json) {
                log::warn!("failed to save {} leaderboard: {}", difficulty, err);
            }
        }
        Err(err) => log::warn!("failed to encode {} leaderboard: {}", difficulty, err),
    }
    is_record
}
