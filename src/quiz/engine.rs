use crate::timer::format_clock;

use super::{Draft, Question, QuestionBank, UserAnswer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAnswer {
    pub question_id: u32,
    pub answer: UserAnswer,
    pub correct: bool,
    pub formatted: String,
}

/// A running quiz. `answers.len() == pointer` holds between calls.
#[derive(Debug, Clone)]
struct Session {
    pointer: usize,
    score: usize,
    elapsed: u64,
    answers: Vec<RecordedAnswer>,
    draft: Draft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTier {
    Excellent,
    Good,
    NeedsReview,
}

impl FeedbackTier {
    pub fn for_percent(percent: u32) -> Self {
        match percent {
            100.. => FeedbackTier::Excellent,
            70..=99 => FeedbackTier::Good,
            _ => FeedbackTier::NeedsReview,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "Excellent! You are an expert!",
            FeedbackTier::Good => "Good result!",
            FeedbackTier::NeedsReview => "Worth going over the material again.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub number: usize,
    pub prompt: String,
    pub answer: String,
    pub correct: bool,
    /// Only present when the user got it wrong.
    pub correct_answer: Option<String>,
}

/// The frozen result of a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub score: usize,
    pub total: usize,
    pub percent: u32,
    pub tier: FeedbackTier,
    pub elapsed: u64,
    pub answers: Vec<RecordedAnswer>,
    pub review: Vec<ReviewItem>,
    pub review_visible: bool,
}

impl Outcome {
    pub fn time(&self) -> String {
        format_clock(self.elapsed)
    }
}

#[derive(Debug, Clone)]
enum Phase {
    Start,
    InProgress(Session),
    Finished(Outcome),
}

/// What `next` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// No usable answer yet, or no session running.
    Blocked,
    Next { correct: bool },
    Finished { correct: bool },
}

/// Progress through the running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub number: usize,
    pub total: usize,
    pub percent: u32,
}

pub fn percent(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((score as f64 / total as f64) * 100.0).round() as u32
}

#[derive(Debug, Clone)]
pub struct QuizEngine {
    bank: QuestionBank,
    phase: Phase,
}

impl QuizEngine {
    pub fn new(bank: QuestionBank) -> Self {
        Self {
            bank,
            phase: Phase::Start,
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn is_started(&self) -> bool {
        !matches!(self.phase, Phase::Start)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::InProgress(_))
    }

    /// Begins a fresh session, discarding whatever came before.
    pub fn start(&mut self) {
        let draft = self.bank.questions()[0].blank_draft();
        self.phase = Phase::InProgress(Session {
            pointer: 0,
            score: 0,
            elapsed: 0,
            answers: Vec::with_capacity(self.bank.len()),
            draft,
        });
        log::debug!("quiz started with {} questions", self.bank.len());
    }

    pub fn restart(&mut self) {
        self.start();
    }

    pub fn current_question(&self) -> Option<&Question> {
        match &self.phase {
            Phase::InProgress(session) => self.bank.get(session.pointer),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.phase {
            Phase::InProgress(session) => Some(&session.draft),
            _ => None,
        }
    }

    pub fn answers(&self) -> &[RecordedAnswer] {
        match &self.phase {
            Phase::Start => &[],
            Phase::InProgress(session) => &session.answers,
            Phase::Finished(outcome) => &outcome.answers,
        }
    }

    pub fn pointer(&self) -> usize {
        match &self.phase {
            Phase::Start => 0,
            Phase::InProgress(session) => session.pointer,
            Phase::Finished(outcome) => outcome.total,
        }
    }

    pub fn score(&self) -> usize {
        match &self.phase {
            Phase::Start => 0,
            Phase::InProgress(session) => session.score,
            Phase::Finished(outcome) => outcome.score,
        }
    }

    pub fn elapsed(&self) -> u64 {
        match &self.phase {
            Phase::Start => 0,
            Phase::InProgress(session) => session.elapsed,
            Phase::Finished(outcome) => outcome.elapsed,
        }
    }

    pub fn progress(&self) -> Option<Progress> {
        let Phase::InProgress(session) = &self.phase else {
            return None;
        };
        Some(Progress {
            number: session.pointer + 1,
            total: self.bank.len(),
            percent: percent(session.pointer, self.bank.len()),
        })
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.phase {
            Phase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn select(&mut self, option: usize) -> bool {
        let in_range = self
            .current_question()
            .is_some_and(|q| option < q.options().len());
        match &mut self.phase {
            Phase::InProgress(session) if in_range => session.draft.select(option),
            _ => false,
        }
    }

    pub fn enter_text(&mut self, text: &str) -> bool {
        match &mut self.phase {
            Phase::InProgress(session) => session.draft.enter_text(text),
            _ => false,
        }
    }

    /// Whether "next" is enabled.
    pub fn can_advance(&self) -> bool {
        self.draft().is_some_and(Draft::is_ready)
    }

    /// Records the current answer and moves on, finishing after the last
    /// question.
    pub fn next(&mut self) -> Advance {
        let Phase::InProgress(session) = &mut self.phase else {
            return Advance::Blocked;
        };
        let Some(question) = self.bank.get(session.pointer) else {
            return Advance::Blocked;
        };
        let Some(answer) = session.draft.submit() else {
            return Advance::Blocked;
        };

        let correct = question.is_correct(&answer);
        if correct {
            session.score += 1;
        }
        session.answers.push(RecordedAnswer {
            question_id: question.id,
            formatted: question.format_answer(&answer),
            answer,
            correct,
        });
        session.pointer += 1;

        if let Some(next) = self.bank.get(session.pointer) {
            session.draft = next.blank_draft();
            return Advance::Next { correct };
        }

        let session = session.clone();
        self.phase = Phase::Finished(self.finish(session));
        Advance::Finished { correct }
    }

    /// One second of elapsed time. Ignored outside a running session.
    pub fn tick(&mut self) {
        if let Phase::InProgress(session) = &mut self.phase {
            session.elapsed += 1;
        }
    }

    pub fn toggle_review(&mut self) -> bool {
        match &mut self.phase {
            Phase::Finished(outcome) => {
                outcome.review_visible = !outcome.review_visible;
                true
            }
            _ => false,
        }
    }

    fn finish(&self, session: Session) -> Outcome {
        let total = self.bank.len();
        let percent = percent(session.score, total);
        let review = session
            .answers
            .iter()
            .zip(self.bank.questions())
            .enumerate()
            .map(|(idx, (answer, question))| ReviewItem {
                number: idx + 1,
                prompt: question.prompt.clone(),
                answer: answer.formatted.clone(),
                correct: answer.correct,
                correct_answer: (!answer.correct).then(|| question.correct_answer_text()),
            })
            .collect();

        log::info!(
            "quiz finished: {}/{} ({}%) in {}",
            session.score,
            total,
            percent,
            format_clock(session.elapsed)
        );

        Outcome {
            score: session.score,
            total,
            percent,
            tier: FeedbackTier::for_percent(percent),
            elapsed: session.elapsed,
            answers: session.answers,
            review,
            review_visible: false,
        }
    }
}

impl Default for QuizEngine {
    fn default() -> Self {
        Self::new(QuestionBank::default())
    }
}
