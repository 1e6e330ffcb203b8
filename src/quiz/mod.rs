use std::collections::BTreeSet;

pub mod bank;
pub mod engine;

pub use bank::{BankError, QuestionBank};
pub use engine::{Advance, FeedbackTier, Outcome, QuizEngine, ReviewItem};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// What kind of answer a question takes, together with the correct one.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice {
        options: Vec<String>,
        correct: usize,
    },
    MultiChoice {
        options: Vec<String>,
        correct: BTreeSet<usize>,
    },
    FreeText {
        expected: String,
    },
}

/// A submitted answer, shaped like the question it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAnswer {
    Single(usize),
    Multi(BTreeSet<usize>),
    Text(String),
}

impl Question {
    pub fn new(id: u32, prompt: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            kind,
        }
    }

    pub fn options(&self) -> &[String] {
        match &self.kind {
            QuestionKind::SingleChoice { options, .. } | QuestionKind::MultiChoice { options, .. } => {
                options.as_slice()
            }
            QuestionKind::FreeText { .. } => &[],
        }
    }

    /// An answer of the wrong shape is never correct.
    pub fn is_correct(&self, answer: &UserAnswer) -> bool {
        match (&self.kind, answer) {
            (QuestionKind::SingleChoice { correct, .. }, UserAnswer::Single(picked)) => {
                picked == correct
            }
            (QuestionKind::MultiChoice { correct, .. }, UserAnswer::Multi(picked)) => {
                picked == correct
            }
            (QuestionKind::FreeText { expected }, UserAnswer::Text(text)) => {
                normalize(text) == normalize(expected)
            }
            _ => false,
        }
    }

    /// Renders an answer the way the review shows it.
    pub fn format_answer(&self, answer: &UserAnswer) -> String {
        match answer {
            UserAnswer::Single(idx) => self.option_label(*idx),
            UserAnswer::Multi(picked) => self.join_options(picked),
            UserAnswer::Text(text) => text.trim().to_string(),
        }
    }

    pub fn correct_answer_text(&self) -> String {
        match &self.kind {
            QuestionKind::SingleChoice { correct, .. } => self.option_label(*correct),
            QuestionKind::MultiChoice { correct, .. } => self.join_options(correct),
            QuestionKind::FreeText { expected } => expected.clone(),
        }
    }

    /// An empty draft matching this question's kind.
    pub fn blank_draft(&self) -> Draft {
        match self.kind {
            QuestionKind::SingleChoice { .. } => Draft::Single(None),
            QuestionKind::MultiChoice { .. } => Draft::Multi(BTreeSet::new()),
            QuestionKind::FreeText { .. } => Draft::Text(String::new()),
        }
    }

    fn option_label(&self, idx: usize) -> String {
        self.options().get(idx).cloned().unwrap_or_default()
    }

    fn join_options(&self, picked: &BTreeSet<usize>) -> String {
        picked
            .iter()
            .map(|&idx| self.option_label(idx))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// The answer being composed for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    Single(Option<usize>),
    Multi(BTreeSet<usize>),
    Text(String),
}

impl Draft {
    /// Picks an option: replaces a single choice, toggles a multiple one.
    /// Returns false when the draft takes no options.
    pub fn select(&mut self, option: usize) -> bool {
        match self {
            Draft::Single(picked) => {
                *picked = Some(option);
                true
            }
            Draft::Multi(picked) => {
                if !picked.remove(&option) {
                    picked.insert(option);
                }
                true
            }
            Draft::Text(_) => false,
        }
    }

    pub fn enter_text(&mut self, input: &str) -> bool {
        match self {
            Draft::Text(text) => {
                *text = input.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn is_selected(&self, option: usize) -> bool {
        match self {
            Draft::Single(picked) => *picked == Some(option),
            Draft::Multi(picked) => picked.contains(&option),
            Draft::Text(_) => false,
        }
    }

    pub fn is_ready(&self) -> bool {
        match self {
            Draft::Single(picked) => picked.is_some(),
            Draft::Multi(picked) => !picked.is_empty(),
            Draft::Text(text) => !text.trim().is_empty(),
        }
    }

    pub fn submit(&self) -> Option<UserAnswer> {
        if !self.is_ready() {
            return None;
        }
        Some(match self {
            Draft::Single(picked) => UserAnswer::Single((*picked)?),
            Draft::Multi(picked) => UserAnswer::Multi(picked.clone()),
            Draft::Text(text) => UserAnswer::Text(text.trim().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single() -> Question {
        Question::new(
            1,
            "Which tag loads a script?",
            QuestionKind::SingleChoice {
                options: vec!["<js>".into(), "<script>".into(), "<link>".into()],
                correct: 1,
            },
        )
    }

    fn multi() -> Question {
        Question::new(
            3,
            "Pick the primitive types",
            QuestionKind::MultiChoice {
                options: vec![
                    "String".into(),
                    "Number".into(),
                    "Float".into(),
                    "Boolean".into(),
                ],
                correct: BTreeSet::from([0, 1, 3]),
            },
        )
    }

    fn text() -> Question {
        Question::new(
            4,
            "typeof \"Hello\"?",
            QuestionKind::FreeText {
                expected: "string".into(),
            },
        )
    }

    #[test]
    fn single_choice_compares_index() {
        assert!(single().is_correct(&UserAnswer::Single(1)));
        assert!(!single().is_correct(&UserAnswer::Single(0)));
    }

    #[test]
    fn multi_choice_ignores_selection_order() {
        let q = multi();
        let mut draft = q.blank_draft();
        for idx in [1, 0, 3] {
            draft.select(idx);
        }
        let answer = draft.submit().unwrap();
        assert!(q.is_correct(&answer));
        assert_eq!(q.format_answer(&answer), "String, Number, Boolean");
    }

    #[test]
    fn multi_choice_gives_no_partial_credit() {
        let q = multi();
        assert!(!q.is_correct(&UserAnswer::Multi(BTreeSet::from([0, 1]))));
        assert!(!q.is_correct(&UserAnswer::Multi(BTreeSet::from([0, 1, 2, 3]))));
    }

    #[test]
    fn free_text_is_trimmed_and_case_insensitive() {
        assert!(text().is_correct(&UserAnswer::Text(" String ".into())));
        assert!(!text().is_correct(&UserAnswer::Text("str".into())));
    }

    #[test]
    fn wrong_shape_is_incorrect() {
        assert!(!single().is_correct(&UserAnswer::Text("1".into())));
        assert!(!text().is_correct(&UserAnswer::Single(0)));
    }

    #[test]
    fn toggling_an_option_twice_clears_it() {
        let mut draft = multi().blank_draft();
        draft.select(2);
        assert!(draft.is_ready());
        draft.select(2);
        assert!(!draft.is_ready());
        assert_eq!(draft.submit(), None);
    }

    #[test]
    fn blank_text_is_not_ready() {
        let mut draft = text().blank_draft();
        assert!(draft.enter_text("   "));
        assert!(!draft.is_ready());
        assert!(!draft.select(0));
    }

    #[test]
    fn correct_answer_text_per_kind() {
        assert_eq!(single().correct_answer_text(), "<script>");
        assert_eq!(multi().correct_answer_text(), "String, Number, Boolean");
        assert_eq!(text().correct_answer_text(), "string");
    }
}
