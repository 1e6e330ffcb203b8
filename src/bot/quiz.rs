use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::MessageId;

use super::action::Action;
use super::session::{BoxFuture, ChatHandle, Repaint, Timers};
use super::view::{button, menu_row, show, Screen};
use super::HandlerResult;
use crate::quiz::{Advance, Draft, FeedbackTier, QuestionBank, QuestionKind, QuizEngine};
use crate::timer::{format_clock, Ticker, TICK};

/// Seconds between clock refreshes of a question left unanswered.
const CLOCK_REFRESH_SECS: u64 = 10;

/// The quiz engine of one chat plus its running clock.
#[derive(Debug)]
pub struct QuizDemo {
    pub engine: QuizEngine,
    pub region: Option<MessageId>,
    clock: Option<Ticker>,
}

impl QuizDemo {
    pub fn new(bank: QuestionBank) -> Self {
        Self {
            engine: QuizEngine::new(bank),
            region: None,
            clock: None,
        }
    }

    /// Starts a fresh session. Any clock from an earlier session is
    /// cancelled when replaced.
    fn start(&mut self, timers: &Timers) {
        self.engine.start();
        self.start_clock(timers);
    }

    /// Picks the clock back up for a quiz left mid-way.
    fn resume(&mut self, timers: &Timers) {
        if self.engine.is_running() && self.clock.is_none() {
            self.start_clock(timers);
        }
    }

    pub(super) fn pause(&mut self) {
        self.stop_clock();
    }

    fn start_clock(&mut self, timers: &Timers) {
        let timers = timers.clone();
        self.clock = Some(Ticker::start(TICK, move || {
            let timers = timers.clone();
            async move {
                let update = timers
                    .sessions
                    .with(timers.chat, |s| {
                        s.quiz.engine.tick();
                        let due = s.quiz.engine.elapsed() % CLOCK_REFRESH_SECS == 0;
                        (due && s.quiz.engine.is_running())
                            .then(|| (s.quiz.region, screen(&s.quiz.engine)))
                    })
                    .await;
                if let Some((region, screen)) = update {
                    (timers.repaint)(region, screen).await;
                }
            }
        }));
    }

    fn stop_clock(&mut self) {
        self.clock = None;
    }
}

pub fn screen(engine: &QuizEngine) -> Screen {
    if let Some(outcome) = engine.outcome() {
        let mut text = format!(
            "Quiz finished!\n\nScore: {} / {} ({}%)\nTime: {}\n{}",
            outcome.score,
            outcome.total,
            outcome.percent,
            outcome.time(),
            tier_line(outcome.tier),
        );
        if outcome.review_visible {
            for item in &outcome.review {
                text.push_str(&format!(
                    "\n\n{}. {}\nYour answer: {} {}",
                    item.number,
                    item.prompt,
                    item.answer,
                    if item.correct { "✅" } else { "❌" }
                ));
                if let Some(correct) = &item.correct_answer {
                    text.push_str(&format!("\nCorrect answer: {}", correct));
                }
            }
        }
        let review_label = if outcome.review_visible {
            "Hide mistakes"
        } else {
            "Show mistakes"
        };
        return Screen::new(
            text,
            vec![
                vec![button(review_label, Action::QuizReview)],
                vec![button("↺ Try again", Action::QuizRestart)],
                menu_row(),
            ],
        );
    }

    let (Some(question), Some(draft), Some(progress)) =
        (engine.current_question(), engine.draft(), engine.progress())
    else {
        return Screen::new(
            format!(
                "JavaScript quiz\n\n{} questions: single choice, multiple choice and typed answers. The clock starts when you do.",
                engine.bank().len()
            ),
            vec![vec![button("▶ Start", Action::QuizStart)], menu_row()],
        );
    };

    let mut text = format!(
        "Question {} of {} · {}% · ⏱ {}\n\n{}. {}",
        progress.number,
        progress.total,
        progress.percent,
        format_clock(engine.elapsed()),
        progress.number,
        question.prompt
    );

    let mut rows = Vec::new();
    match &question.kind {
        QuestionKind::SingleChoice { options, .. } | QuestionKind::MultiChoice { options, .. } => {
            let multi = matches!(question.kind, QuestionKind::MultiChoice { .. });
            for (idx, option) in options.iter().enumerate() {
                let marker = match (multi, draft.is_selected(idx)) {
                    (false, true) => "🔘",
                    (false, false) => "⚪",
                    (true, true) => "☑",
                    (true, false) => "☐",
                };
                rows.push(vec![button(
                    format!("{} {}", marker, option),
                    Action::QuizOption(idx),
                )]);
            }
        }
        QuestionKind::FreeText { .. } => {
            text.push_str("\n\nType your answer as a message.");
            if let Draft::Text(answer) = draft {
                if !answer.trim().is_empty() {
                    text.push_str(&format!("\nYour answer: {}", answer.trim()));
                }
            }
        }
    }

    let next = if engine.can_advance() {
        button("Next ➡", Action::QuizNext)
    } else {
        button("Next (answer first)", Action::Noop)
    };
    rows.push(vec![next]);
    rows.push(menu_row());
    Screen::new(text, rows)
}

fn tier_line(tier: FeedbackTier) -> String {
    let icon = match tier {
        FeedbackTier::Excellent => "🏆",
        FeedbackTier::Good => "👍",
        FeedbackTier::NeedsReview => "📚",
    };
    format!("{} {}", icon, tier.message())
}

/// Why a typed message was not taken as an answer.
fn text_hint(engine: &QuizEngine) -> &'static str {
    if engine.outcome().is_some() {
        "The quiz is over. Press ↺ Try again to take it once more."
    } else if engine.is_running() {
        "This question is answered with the buttons above."
    } else {
        "Press ▶ Start to begin the quiz."
    }
}

fn repainter(handle: ChatHandle) -> Repaint {
    Arc::new(move |region: Option<MessageId>, screen: Screen| -> BoxFuture {
        let handle = handle.clone();
        Box::pin(async move {
            if region.is_none() {
                return;
            }
            if let Err(err) = redraw(&handle, region, screen).await {
                log::warn!("failed to refresh quiz in chat {}: {}", handle.chat.0, err);
            }
        })
    })
}

pub async fn open(handle: ChatHandle) -> HandlerResult {
    let timers = handle.timers(repainter(handle.clone()));
    let (region, screen) = handle
        .sessions
        .with(handle.chat, |s| {
            s.quiz.resume(&timers);
            (s.quiz.region, screen(&s.quiz.engine))
        })
        .await;
    redraw(&handle, region, screen).await
}

pub async fn start(handle: ChatHandle) -> HandlerResult {
    let timers = handle.timers(repainter(handle.clone()));
    let (region, screen) = handle
        .sessions
        .with(handle.chat, |s| {
            s.quiz.start(&timers);
            (s.quiz.region, screen(&s.quiz.engine))
        })
        .await;
    redraw(&handle, region, screen).await
}

pub async fn select(handle: ChatHandle, option: usize) -> HandlerResult {
    let update = handle
        .sessions
        .with(handle.chat, |s| {
            s.quiz
                .engine
                .select(option)
                .then(|| (s.quiz.region, screen(&s.quiz.engine)))
        })
        .await;
    match update {
        Some((region, screen)) => redraw(&handle, region, screen).await,
        None => Ok(()),
    }
}

/// A text message typed while the quiz is open.
pub async fn enter_text(handle: ChatHandle, text: &str) -> HandlerResult {
    let update = handle
        .sessions
        .with(handle.chat, |s| {
            if s.quiz.engine.enter_text(text) {
                Ok(screen(&s.quiz.engine))
            } else {
                Err(text_hint(&s.quiz.engine))
            }
        })
        .await;
    match update {
        // the answer arrives below the quiz, so the quiz moves down with it
        Ok(screen) => redraw(&handle, None, screen).await,
        Err(hint) => {
            handle.bot.send_message(handle.chat, hint).await?;
            Ok(())
        }
    }
}

pub async fn next(handle: ChatHandle) -> HandlerResult {
    let (region, screen) = handle
        .sessions
        .with(handle.chat, |s| {
            match s.quiz.engine.next() {
                Advance::Finished { .. } => s.quiz.stop_clock(),
                Advance::Next { .. } | Advance::Blocked => {}
            }
            (s.quiz.region, screen(&s.quiz.engine))
        })
        .await;
    redraw(&handle, region, screen).await
}

pub async fn toggle_review(handle: ChatHandle) -> HandlerResult {
    let (region, screen) = handle
        .sessions
        .with(handle.chat, |s| {
            s.quiz.engine.toggle_review();
            (s.quiz.region, screen(&s.quiz.engine))
        })
        .await;
    redraw(&handle, region, screen).await
}

async fn redraw(handle: &ChatHandle, region: Option<MessageId>, screen: Screen) -> HandlerResult {
    let id = show(&handle.bot, handle.chat, region, screen).await?;
    handle
        .sessions
        .with(handle.chat, |s| s.quiz.region = Some(id))
        .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::session::testing::{counting_timers, repaints};
    use crate::bot::session::ChatSession;
    use crate::bot::view::testing::{callbacks, labels};
    use std::time::Duration;
    use tokio::time::sleep;

    async fn elapsed(timers: &Timers) -> u64 {
        timers.sessions.with(timers.chat, |s| s.quiz.engine.elapsed()).await
    }

    #[test]
    fn start_screen_offers_start() {
        let screen = screen(&QuizEngine::default());
        assert!(screen.text.contains("10 questions"));
        assert_eq!(callbacks(&screen), vec![vec!["quiz:start"], vec!["menu"]]);
    }

    #[test]
    fn next_stays_disabled_until_answered() {
        let mut engine = QuizEngine::default();
        engine.start();
        let before = screen(&engine);
        assert_eq!(callbacks(&before)[4], vec!["noop"]);
        assert!(before.text.starts_with("Question 1 of 10 · 0% · ⏱ 00:00"));

        engine.select(1);
        let after = screen(&engine);
        assert_eq!(callbacks(&after)[4], vec!["quiz:next"]);
        assert_eq!(labels(&after)[1], "🔘 <script>");
        assert_eq!(labels(&after)[0], "⚪ <js>");
    }

    #[test]
    fn finished_screen_toggles_review() {
        let mut engine = QuizEngine::default();
        engine.start();
        while engine.is_running() {
            let question = engine.current_question().unwrap().clone();
            if question.options().is_empty() {
                engine.enter_text("?");
            } else {
                engine.select(0);
            }
            engine.next();
        }

        let hidden = screen(&engine);
        assert!(hidden.text.contains("Score: 0 / 10 (0%)"));
        assert!(!hidden.text.contains("Correct answer"));
        assert_eq!(labels(&hidden)[0], "Show mistakes");

        engine.toggle_review();
        let shown = screen(&engine);
        assert!(shown.text.contains("1. Which HTML tag includes a JavaScript file?\nYour answer: <js> ❌\nCorrect answer: <script>"));
        assert_eq!(labels(&shown)[0], "Hide mistakes");
    }

    #[test]
    fn stray_text_gets_a_hint() {
        let mut engine = QuizEngine::default();
        assert_eq!(text_hint(&engine), "Press ▶ Start to begin the quiz.");
        engine.start();
        assert!(!engine.enter_text("script"));
        assert_eq!(
            text_hint(&engine),
            "This question is answered with the buttons above."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_the_quiz_pauses_its_clock() {
        let (timers, _) = counting_timers();
        timers.sessions.with(timers.chat, |s| s.quiz.start(&timers)).await;
        sleep(Duration::from_millis(2_500)).await;
        assert_eq!(elapsed(&timers).await, 2);

        timers.sessions.with(timers.chat, ChatSession::leave).await;
        sleep(Duration::from_secs(3_600)).await;
        assert_eq!(elapsed(&timers).await, 2);

        timers.sessions.with(timers.chat, |s| s.quiz.resume(&timers)).await;
        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(elapsed(&timers).await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn clock_refreshes_the_screen_every_few_seconds() {
        let (timers, count) = counting_timers();
        timers.sessions.with(timers.chat, |s| s.quiz.start(&timers)).await;

        sleep(Duration::from_millis(9_500)).await;
        assert_eq!(repaints(&count), 0);
        sleep(Duration::from_secs(1)).await;
        assert_eq!(repaints(&count), 1);
        sleep(Duration::from_secs(10)).await;
        assert_eq!(repaints(&count), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn finishing_stops_the_clock() {
        let (timers, _) = counting_timers();
        timers.sessions.with(timers.chat, |s| s.quiz.start(&timers)).await;
        sleep(Duration::from_millis(1_500)).await;

        timers
            .sessions
            .with(timers.chat, |s| {
                while s.quiz.engine.is_running() {
                    if s.quiz.engine.current_question().unwrap().options().is_empty() {
                        s.quiz.engine.enter_text("?");
                    } else {
                        s.quiz.engine.select(0);
                    }
                    if let Advance::Finished { .. } = s.quiz.engine.next() {
                        s.quiz.stop_clock();
                    }
                }
                assert!(s.quiz.clock.is_none());
            })
            .await;
        sleep(Duration::from_secs(5)).await;
        let outcome = timers
            .sessions
            .with(timers.chat, |s| s.quiz.engine.outcome().map(|o| o.elapsed))
            .await;
        assert_eq!(outcome, Some(1));
    }
}
