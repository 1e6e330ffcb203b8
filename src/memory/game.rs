use rand::Rng;

use super::deck::{build_deck, shuffle, Card};
use super::leaderboard::{self, KeyValueStore, ScoreRecord};
use super::{time_bonus, Difficulty, MATCH_POINTS};
use crate::timer::format_clock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardState {
    pub card: Card,
    pub revealed: bool,
    pub matched: bool,
}

impl CardState {
    pub fn is_face_up(&self) -> bool {
        self.revealed || self.matched
    }
}

/// A board in play.
#[derive(Debug, Clone)]
pub struct Board {
    difficulty: Difficulty,
    cards: Vec<CardState>,
    moves: u32,
    score: u32,
    matched_pairs: usize,
    first: Option<usize>,
    second: Option<usize>,
    locked: bool,
    elapsed: u64,
    pending: Option<GameResult>,
}

impl Board {
    fn new(difficulty: Difficulty, deck: Vec<Card>) -> Self {
        Self {
            difficulty,
            cards: deck
                .into_iter()
                .map(|card| CardState {
                    card,
                    revealed: false,
                    matched: false,
                })
                .collect(),
            moves: 0,
            score: 0,
            matched_pairs: 0,
            first: None,
            second: None,
            locked: false,
            elapsed: 0,
            pending: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn cards(&self) -> &[CardState] {
        &self.cards
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_complete(&self) -> bool {
        self.matched_pairs == self.difficulty.pairs()
    }

    fn clear_selection(&mut self) {
        self.first = None;
        self.second = None;
        self.locked = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub difficulty: Difficulty,
    pub raw_score: u32,
    pub time_bonus: u32,
    pub final_score: u32,
    pub moves: u32,
    pub time: String,
    pub new_record: bool,
}

/// What a click on a card did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    Ignored,
    First,
    Matched,
    /// The pair stays face up and the board is locked until
    /// [`MemoryGame::hide_mismatch`].
    Mismatched,
    /// The last pair was matched.
    Completed,
}

#[derive(Debug, Clone)]
enum Phase {
    Start,
    Playing(Board),
    Result(GameResult),
}

#[derive(Debug, Clone)]
pub struct MemoryGame {
    phase: Phase,
    difficulty: Difficulty,
}

impl MemoryGame {
    pub fn new() -> Self {
        Self {
            phase: Phase::Start,
            difficulty: Difficulty::Easy,
        }
    }

    pub fn board(&self) -> Option<&Board> {
        match &self.phase {
            Phase::Playing(board) => Some(board),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&GameResult> {
        match &self.phase {
            Phase::Result(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_at_start(&self) -> bool {
        matches!(self.phase, Phase::Start)
    }

    /// The difficulty of the current or most recent game.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Deals a shuffled deck and resets every counter.
    pub fn start<R: Rng + ?Sized>(&mut self, difficulty: Difficulty, rng: &mut R) {
        let mut deck = build_deck(difficulty);
        shuffle(&mut deck, rng);
        self.difficulty = difficulty;
        self.phase = Phase::Playing(Board::new(difficulty, deck));
        log::debug!("memory game started on {}", difficulty);
    }

    pub fn play_again<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.start(self.difficulty, rng);
    }

    /// Leaves a game in progress for the start screen.
    pub fn abandon(&mut self) {
        self.phase = Phase::Start;
    }

    pub fn home(&mut self) {
        self.phase = Phase::Start;
    }

    pub fn flip(&mut self, index: usize) -> Flip {
        let Phase::Playing(board) = &mut self.phase else {
            return Flip::Ignored;
        };
        if board.locked || board.pending.is_some() || board.is_complete() {
            return Flip::Ignored;
        }
        match board.cards.get(index) {
            Some(state) if !state.matched => {}
            _ => return Flip::Ignored,
        }
        if board.first == Some(index) {
            return Flip::Ignored;
        }

        board.cards[index].revealed = true;

        let Some(first) = board.first else {
            board.first = Some(index);
            return Flip::First;
        };

        board.second = Some(index);
        board.moves += 1;

        if board.cards[first].card.pair_id != board.cards[index].card.pair_id {
            board.locked = true;
            return Flip::Mismatched;
        }

        board.cards[first].matched = true;
        board.cards[index].matched = true;
        board.score += MATCH_POINTS;
        board.matched_pairs += 1;
        board.clear_selection();

        if board.is_complete() {
            Flip::Completed
        } else {
            Flip::Matched
        }
    }

    /// Turns a mismatched pair back over and unlocks the board.
    pub fn hide_mismatch(&mut self) -> bool {
        let Phase::Playing(board) = &mut self.phase else {
            return false;
        };
        if !board.locked {
            return false;
        }
        for idx in [board.first, board.second].into_iter().flatten() {
            board.cards[idx].revealed = false;
        }
        board.clear_selection();
        true
    }

    pub fn tick(&mut self) {
        if let Phase::Playing(board) = &mut self.phase {
            if !board.is_complete() {
                board.elapsed += 1;
            }
        }
    }

    /// Scores a completed board and records it on the leaderboard. The
    /// result screen follows on [`MemoryGame::show_result`].
    pub fn finish<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        date: &str,
    ) -> Option<GameResult> {
        let Phase::Playing(board) = &mut self.phase else {
            return None;
        };
        if !board.is_complete() || board.pending.is_some() {
            return None;
        }

        let bonus = time_bonus(board.elapsed);
        let final_score = board.score + bonus;
        let time = format_clock(board.elapsed);
        let new_record = leaderboard::submit(
            store,
            board.difficulty,
            ScoreRecord {
                score: final_score,
                date: date.to_string(),
                moves: board.moves,
                time: time.clone(),
            },
        );

        let result = GameResult {
            difficulty: board.difficulty,
            raw_score: board.score,
            time_bonus: bonus,
            final_score,
            moves: board.moves,
            time,
            new_record,
        };
        log::info!(
            "memory game on {} finished: {} points in {} moves{}",
            result.difficulty,
            result.final_score,
            result.moves,
            if new_record { ", new record" } else { "" }
        );
        board.pending = Some(result.clone());
        Some(result)
    }

    pub fn show_result(&mut self) -> bool {
        let Phase::Playing(board) = &mut self.phase else {
            return false;
        };
        match board.pending.take() {
            Some(result) => {
                self.phase = Phase::Result(result);
                true
            }
            None => false,
        }
    }
}

impl Default for MemoryGame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::leaderboard::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn started(difficulty: Difficulty) -> MemoryGame {
        let mut game = MemoryGame::new();
        game.start(difficulty, &mut StdRng::seed_from_u64(3));
        game
    }

    fn partner(game: &MemoryGame, index: usize) -> usize {
        let cards = game.board().unwrap().cards();
        let id = cards[index].card.pair_id;
        (0..cards.len())
            .find(|&i| i != index && cards[i].card.pair_id == id)
            .unwrap()
    }

    fn stranger(game: &MemoryGame, index: usize) -> usize {
        let cards = game.board().unwrap().cards();
        let id = cards[index].card.pair_id;
        (0..cards.len()).find(|&i| cards[i].card.pair_id != id).unwrap()
    }

    fn match_all(game: &mut MemoryGame) -> Flip {
        let mut last = Flip::Ignored;
        while let Some(idx) = game
            .board()
            .and_then(|b| b.cards().iter().position(|c| !c.matched))
        {
            let other = partner(game, idx);
            assert_eq!(game.flip(idx), Flip::First);
            last = game.flip(other);
        }
        last
    }

    #[test]
    fn start_deals_a_hidden_board() {
        let game = started(Difficulty::Easy);
        let board = game.board().unwrap();
        assert_eq!(board.cards().len(), 12);
        assert!(board.cards().iter().all(|c| !c.is_face_up()));
        assert_eq!((board.moves(), board.score(), board.elapsed()), (0, 0, 0));
    }

    #[test]
    fn matching_pair_scores_without_locking() {
        let mut game = started(Difficulty::Easy);
        let other = partner(&game, 0);

        assert_eq!(game.flip(0), Flip::First);
        assert_eq!(game.flip(other), Flip::Matched);

        let board = game.board().unwrap();
        assert!(board.cards()[0].matched && board.cards()[other].matched);
        assert_eq!(board.score(), 10);
        assert_eq!(board.moves(), 1);
        assert_eq!(board.matched_pairs(), 1);
        assert!(!board.is_locked());
    }

    #[test]
    fn mismatch_locks_until_hidden() {
        let mut game = started(Difficulty::Easy);
        let other = stranger(&game, 0);
        let third = partner(&game, other);

        game.flip(0);
        assert_eq!(game.flip(other), Flip::Mismatched);
        assert!(game.board().unwrap().is_locked());
        assert_eq!(game.flip(third), Flip::Ignored);

        assert!(game.hide_mismatch());
        let board = game.board().unwrap();
        assert!(!board.is_locked());
        assert!(!board.cards()[0].revealed && !board.cards()[other].revealed);
        assert_eq!(board.moves(), 1);
        assert_eq!(board.score(), 0);
        assert!(!game.hide_mismatch());
    }

    #[test]
    fn clicking_the_revealed_card_again_is_ignored() {
        let mut game = started(Difficulty::Easy);
        assert_eq!(game.flip(0), Flip::First);
        assert_eq!(game.flip(0), Flip::Ignored);
        assert_eq!(game.board().unwrap().moves(), 0);
    }

    #[test]
    fn matched_cards_stay_out_of_play() {
        let mut game = started(Difficulty::Easy);
        let other = partner(&game, 0);
        game.flip(0);
        game.flip(other);

        assert_eq!(game.flip(0), Flip::Ignored);
        assert_eq!(game.flip(other), Flip::Ignored);
        assert_eq!(game.flip(99), Flip::Ignored);
    }

    #[test]
    fn quick_finish_earns_time_bonus() {
        let mut game = started(Difficulty::Easy);
        for _ in 0..45 {
            game.tick();
        }
        assert_eq!(match_all(&mut game), Flip::Completed);
        game.tick();

        let mut store = MemoryStore::new();
        let result = game.finish(&mut store, "2026-10-18").unwrap();
        assert_eq!(result.raw_score, 60);
        assert_eq!(result.time_bonus, 15);
        assert_eq!(result.final_score, 75);
        assert_eq!(result.time, "00:45");
        assert!(result.new_record);

        // finishing twice does nothing
        assert!(game.finish(&mut store, "2026-10-18").is_none());
        assert_eq!(leaderboard::load(&store, Difficulty::Easy).len(), 1);
    }

    #[test]
    fn slow_finish_earns_no_bonus() {
        let mut game = started(Difficulty::Hard);
        for _ in 0..75 {
            game.tick();
        }
        match_all(&mut game);

        let result = game.finish(&mut MemoryStore::new(), "2026-10-18").unwrap();
        assert_eq!(result.time_bonus, 0);
        assert_eq!(result.final_score, 80);
    }

    #[test]
    fn result_screen_follows_finish() {
        let mut game = started(Difficulty::Easy);
        assert!(!game.show_result());
        match_all(&mut game);
        assert!(!game.show_result());

        game.finish(&mut MemoryStore::new(), "2026-10-18");
        assert!(game.show_result());
        assert_eq!(game.result().unwrap().difficulty, Difficulty::Easy);
        assert!(game.board().is_none());

        game.play_again(&mut StdRng::seed_from_u64(9));
        assert_eq!(game.board().unwrap().difficulty(), Difficulty::Easy);
    }

    #[test]
    fn abandon_returns_to_start() {
        let mut game = started(Difficulty::Hard);
        game.flip(0);
        game.abandon();
        assert!(game.is_at_start());
        assert_eq!(game.flip(0), Flip::Ignored);
        assert_eq!(game.difficulty(), Difficulty::Hard);
    }
}
