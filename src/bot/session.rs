use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use teloxide::prelude::*;
use teloxide::types::MessageId;

use super::memory::MemoryDemo;
use super::quiz::QuizDemo;
use super::sort::SortDemo;
use super::view::Screen;
use crate::memory::leaderboard::{self, KeyValueStore, ScoreRecord};
use crate::memory::{Difficulty, GameResult, MemoryGame};
use crate::quiz::QuestionBank;

/// Everything one chat has open.
pub struct ChatSession {
    pub sort: SortDemo,
    pub quiz: QuizDemo,
    pub memory: MemoryDemo,
}

impl ChatSession {
    fn new(bank: QuestionBank) -> Self {
        Self {
            sort: SortDemo::default(),
            quiz: QuizDemo::new(bank),
            memory: MemoryDemo::default(),
        }
    }

    /// Pauses the timed demos when the chat navigates away from them.
    pub fn leave(&mut self) {
        self.quiz.pause();
        self.memory.pause();
    }
}

/// Live sessions of every chat. Handlers and timers take turns on the lock,
/// so a session is never mutated by two events at once.
#[derive(Clone)]
pub struct Sessions {
    inner: Arc<tokio::sync::Mutex<HashMap<ChatId, ChatSession>>>,
    bank: Arc<QuestionBank>,
}

impl Sessions {
    pub fn new(bank: QuestionBank) -> Self {
        Self {
            inner: Arc::default(),
            bank: Arc::new(bank),
        }
    }

    /// Runs `f` on the chat's session, opening one if needed.
    pub async fn with<R>(&self, chat: ChatId, f: impl FnOnce(&mut ChatSession) -> R) -> R {
        let mut sessions = self.inner.lock().await;
        let session = sessions
            .entry(chat)
            .or_insert_with(|| ChatSession::new(self.bank.as_ref().clone()));
        f(session)
    }
}

/// What a scheduled task needs to reach back into its chat.
#[derive(Clone)]
pub struct ChatHandle {
    pub bot: Bot,
    pub sessions: Sessions,
    pub chat: ChatId,
}

impl ChatHandle {
    pub fn timers(&self, repaint: Repaint) -> Timers {
        Timers {
            sessions: self.sessions.clone(),
            chat: self.chat,
            repaint,
        }
    }
}

pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Pushes a screen a timer produced to the demo's message.
pub type Repaint = Arc<dyn Fn(Option<MessageId>, Screen) -> BoxFuture + Send + Sync>;

/// What a clock or delay task needs to change its chat's session.
#[derive(Clone)]
pub struct Timers {
    pub sessions: Sessions,
    pub chat: ChatId,
    pub repaint: Repaint,
}

/// Shared leaderboard storage.
#[derive(Clone)]
pub struct Scores {
    store: Arc<Mutex<Box<dyn KeyValueStore + Send>>>,
}

impl Scores {
    pub fn new(store: impl KeyValueStore + Send + 'static) -> Self {
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
        }
    }

    pub fn previews(&self) -> Vec<(Difficulty, Vec<ScoreRecord>)> {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        Difficulty::ALL
            .iter()
            .map(|&difficulty| (difficulty, leaderboard::load(&**store, difficulty)))
            .collect()
    }

    /// Scores a completed game and records it with today's date.
    pub fn finish(&self, game: &mut MemoryGame) -> Option<GameResult> {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        game.finish(&mut **store, &today)
    }
}
