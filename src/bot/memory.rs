use std::sync::Arc;

use rand::Rng;
use teloxide::types::{InlineKeyboardButton, MessageId};

use super::action::Action;
use super::session::{BoxFuture, ChatHandle, Repaint, Scores, Timers};
use super::view::{button, menu_row, show, Screen};
use super::HandlerResult;
use crate::memory::game::CardState;
use crate::memory::leaderboard::ScoreRecord;
use crate::memory::{Difficulty, Flip, MemoryGame, MISMATCH_DELAY, RESULT_DELAY};
use crate::timer::{format_clock, Delay, Ticker, TICK};

/// The memory game of one chat with its clock and pending delay.
#[derive(Debug, Default)]
pub struct MemoryDemo {
    pub game: MemoryGame,
    pub region: Option<MessageId>,
    clock: Option<Ticker>,
    pending: Option<Delay>,
}

impl MemoryDemo {
    fn start<R: Rng + ?Sized>(&mut self, difficulty: Difficulty, rng: &mut R, timers: &Timers) {
        self.game.start(difficulty, rng);
        self.start_clock(timers);
    }

    fn play_again<R: Rng + ?Sized>(&mut self, rng: &mut R, timers: &Timers) {
        self.game.play_again(rng);
        self.start_clock(timers);
    }

    /// Drops the clock and any pending delay of the previous game.
    fn stop(&mut self) {
        self.clock = None;
        self.pending = None;
    }

    /// Stops the timers while the chat is elsewhere. Whatever the pending
    /// delay would have done happens at once, so the board is never left
    /// locked.
    pub(super) fn pause(&mut self) {
        self.stop();
        self.game.hide_mismatch();
        self.game.show_result();
    }

    fn resume(&mut self, timers: &Timers) {
        let playing = self.game.board().is_some_and(|board| !board.is_complete());
        if playing && self.clock.is_none() {
            self.start_clock(timers);
        }
    }

    /// Flips a card and schedules what follows it. False when the flip was
    /// ignored.
    fn flip(&mut self, index: usize, scores: &Scores, timers: &Timers) -> bool {
        match self.game.flip(index) {
            Flip::Ignored => return false,
            Flip::First | Flip::Matched => {}
            Flip::Mismatched => self.schedule_hide(timers),
            Flip::Completed => {
                self.stop();
                scores.finish(&mut self.game);
                self.schedule_result(timers);
            }
        }
        true
    }

    fn start_clock(&mut self, timers: &Timers) {
        self.pending = None;
        let timers = timers.clone();
        self.clock = Some(Ticker::start(TICK, move || {
            let timers = timers.clone();
            async move {
                timers
                    .sessions
                    .with(timers.chat, |s| s.memory.game.tick())
                    .await;
            }
        }));
    }

    fn schedule_hide(&mut self, timers: &Timers) {
        let timers = timers.clone();
        self.pending = Some(Delay::schedule(MISMATCH_DELAY, move || async move {
            let update = timers
                .sessions
                .with(timers.chat, |s| {
                    s.memory
                        .game
                        .hide_mismatch()
                        .then(|| (s.memory.region, screen(&s.memory.game, &[])))
                })
                .await;
            if let Some((region, screen)) = update {
                (timers.repaint)(region, screen).await;
            }
        }));
    }

    fn schedule_result(&mut self, timers: &Timers) {
        let timers = timers.clone();
        self.pending = Some(Delay::schedule(RESULT_DELAY, move || async move {
            let update = timers
                .sessions
                .with(timers.chat, |s| {
                    s.memory
                        .game
                        .show_result()
                        .then(|| (s.memory.region, screen(&s.memory.game, &[])))
                })
                .await;
            if let Some((region, screen)) = update {
                (timers.repaint)(region, screen).await;
            }
        }));
    }
}

/// Renders the game. `previews` fills the start screen's leaderboard.
pub fn screen(game: &MemoryGame, previews: &[(Difficulty, Vec<ScoreRecord>)]) -> Screen {
    if let Some(result) = game.result() {
        let mut text = format!(
            "All pairs found!\n\nTime: {}\nMoves: {}\nScore: {} + {} time bonus = {}",
            result.time, result.moves, result.raw_score, result.time_bonus, result.final_score
        );
        if result.new_record {
            text.push_str("\n\n🏆 New record!");
        }
        return Screen::new(
            text,
            vec![
                vec![button("↺ Play again", Action::MemoryAgain)],
                vec![button("Home", Action::MemoryHome)],
                menu_row(),
            ],
        );
    }

    let Some(board) = game.board() else {
        let mut text = String::from(
            "Memory game\n\nMatch every term with its definition. Fewer moves and a quick finish score higher.",
        );
        for (difficulty, scores) in previews {
            text.push_str(&format!("\n\nBest scores ({}):", difficulty));
            if scores.is_empty() {
                text.push_str("\nNo records yet");
            }
            for (rank, record) in scores.iter().enumerate() {
                text.push_str(&format!(
                    "\n#{} {} · {} points · {} moves · {}",
                    rank + 1,
                    record.date,
                    record.score,
                    record.moves,
                    record.time
                ));
            }
        }
        return Screen::new(
            text,
            vec![
                vec![
                    button("Easy (6 pairs)", Action::MemoryStart(Difficulty::Easy)),
                    button("Hard (8 pairs)", Action::MemoryStart(Difficulty::Hard)),
                ],
                menu_row(),
            ],
        );
    };

    let text = format!(
        "Memory game · {}\n⏱ {} · Moves: {} · Score: {} · Pairs: {}/{}",
        board.difficulty(),
        format_clock(board.elapsed()),
        board.moves(),
        board.score(),
        board.matched_pairs(),
        board.difficulty().pairs()
    );
    let mut rows: Vec<Vec<InlineKeyboardButton>> = board
        .cards()
        .chunks(board.difficulty().columns())
        .enumerate()
        .map(|(row, cards)| {
            cards
                .iter()
                .enumerate()
                .map(|(col, card)| {
                    card_button(card, row * board.difficulty().columns() + col)
                })
                .collect()
        })
        .collect();
    rows.push(vec![button("↺ Restart", Action::MemoryRestart)]);
    Screen::new(text, rows)
}

fn card_button(card: &CardState, index: usize) -> InlineKeyboardButton {
    if card.matched {
        button(format!("✅ {}", card.card.content), Action::Noop)
    } else if card.revealed {
        button(card.card.content.clone(), Action::Noop)
    } else {
        button("❓", Action::MemoryCard(index))
    }
}

fn repainter(handle: ChatHandle) -> Repaint {
    Arc::new(move |region: Option<MessageId>, screen: Screen| -> BoxFuture {
        let handle = handle.clone();
        Box::pin(async move {
            if let Err(err) = redraw(&handle, region, screen).await {
                log::warn!("failed to redraw memory game in chat {}: {}", handle.chat.0, err);
            }
        })
    })
}

pub async fn open(handle: ChatHandle, scores: Scores) -> HandlerResult {
    let previews = scores.previews();
    let timers = handle.timers(repainter(handle.clone()));
    let (region, screen) = handle
        .sessions
        .with(handle.chat, |s| {
            s.memory.resume(&timers);
            (s.memory.region, screen(&s.memory.game, &previews))
        })
        .await;
    redraw(&handle, region, screen).await
}

pub async fn start(handle: ChatHandle, difficulty: Difficulty) -> HandlerResult {
    let timers = handle.timers(repainter(handle.clone()));
    let (region, screen) = handle
        .sessions
        .with(handle.chat, |s| {
            s.memory.start(difficulty, &mut rand::thread_rng(), &timers);
            (s.memory.region, screen(&s.memory.game, &[]))
        })
        .await;
    redraw(&handle, region, screen).await
}

pub async fn play_again(handle: ChatHandle) -> HandlerResult {
    let timers = handle.timers(repainter(handle.clone()));
    let (region, screen) = handle
        .sessions
        .with(handle.chat, |s| {
            s.memory.play_again(&mut rand::thread_rng(), &timers);
            (s.memory.region, screen(&s.memory.game, &[]))
        })
        .await;
    redraw(&handle, region, screen).await
}

/// Restart during play and "home" on the result screen both lead back to
/// difficulty selection.
pub async fn back_to_start(handle: ChatHandle, scores: Scores) -> HandlerResult {
    let previews = scores.previews();
    let (region, screen) = handle
        .sessions
        .with(handle.chat, |s| {
            s.memory.stop();
            s.memory.game.abandon();
            (s.memory.region, screen(&s.memory.game, &previews))
        })
        .await;
    redraw(&handle, region, screen).await
}

pub async fn flip(handle: ChatHandle, scores: Scores, index: usize) -> HandlerResult {
    let timers = handle.timers(repainter(handle.clone()));
    let update = handle
        .sessions
        .with(handle.chat, |s| {
            s.memory
                .flip(index, &scores, &timers)
                .then(|| (s.memory.region, screen(&s.memory.game, &[])))
        })
        .await;
    match update {
        Some((region, screen)) => redraw(&handle, region, screen).await,
        None => Ok(()),
    }
}

async fn redraw(handle: &ChatHandle, region: Option<MessageId>, screen: Screen) -> HandlerResult {
    let id = show(&handle.bot, handle.chat, region, screen).await?;
    handle
        .sessions
        .with(handle.chat, |s| s.memory.region = Some(id))
        .await;
    Ok(())
}
