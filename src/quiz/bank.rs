use std::collections::BTreeSet;
use std::io::Read;

use thiserror::Error;

use super::{Question, QuestionKind};

#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to parse question bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question bank is empty")]
    Empty,
    #[error("question {id}: {reason}")]
    Invalid { id: u32, reason: &'static str },
}

/// An ordered, validated list of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty);
        }
        for question in &questions {
            validate(question)?;
        }
        Ok(Self { questions })
    }

    /// Reads a JSON array of questions.
    pub fn from_reader(reader: impl Read) -> Result<Self, BankError> {
        let questions: Vec<Question> = serde_json::from_reader(reader)?;
        Self::new(questions)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Question> {
        self.questions.get(idx)
    }
}

fn validate(question: &Question) -> Result<(), BankError> {
    let invalid = |reason| BankError::Invalid {
        id: question.id,
        reason,
    };
    match &question.kind {
        QuestionKind::SingleChoice { options, correct } => {
            if *correct >= options.len() {
                return Err(invalid("correct option out of range"));
            }
        }
        QuestionKind::MultiChoice { options, correct } => {
            if correct.is_empty() {
                return Err(invalid("no correct options"));
            }
            if correct.iter().any(|&idx| idx >= options.len()) {
                return Err(invalid("correct option out of range"));
            }
        }
        QuestionKind::FreeText { expected } => {
            if expected.trim().is_empty() {
                return Err(invalid("expected answer is blank"));
            }
        }
    }
    Ok(())
}

fn options(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for QuestionBank {
    /// The built-in JavaScript basics quiz.
    fn default() -> Self {
        let questions = vec![
            Question::new(
                1,
                "Which HTML tag includes a JavaScript file?",
                QuestionKind::SingleChoice {
                    options: options(&["<js>", "<script>", "<javascript>", "<link>"]),
                    correct: 1,
                },
            ),
            Question::new(
                2,
                "How do you declare a variable whose value cannot change?",
                QuestionKind::SingleChoice {
                    options: options(&["var", "let", "const", "static"]),
                    correct: 2,
                },
            ),
            Question::new(
                3,
                "Select the data types that exist in JavaScript (several answers):",
                QuestionKind::MultiChoice {
                    options: options(&["String", "Number", "Float", "Boolean", "Character"]),
                    correct: BTreeSet::from([0, 1, 3]),
                },
            ),
            Question::new(
                4,
                "What does console.log(typeof \"Hello\") print?",
                QuestionKind::FreeText {
                    expected: "string".into(),
                },
            ),
            Question::new(
                5,
                "Which method appends an element to the end of an array?",
                QuestionKind::SingleChoice {
                    options: options(&["pop()", "shift()", "unshift()", "push()"]),
                    correct: 3,
                },
            ),
            Question::new(
                6,
                "What does DOM stand for?",
                QuestionKind::SingleChoice {
                    options: options(&[
                        "Data Object Model",
                        "Document Object Model",
                        "Document Oriented Module",
                        "Digital Ordinance Model",
                    ]),
                    correct: 1,
                },
            ),
            Question::new(
                7,
                "Which comparison operators exist in JS?",
                QuestionKind::MultiChoice {
                    options: options(&["==", "===", "!=", "><", "<>"]),
                    correct: BTreeSet::from([0, 1, 2]),
                },
            ),
            Question::new(
                8,
                "Type the keyword that declares a function.",
                QuestionKind::FreeText {
                    expected: "function".into(),
                },
            ),
            Question::new(
                9,
                "How do you show a modal window with the text \"Hello\"?",
                QuestionKind::SingleChoice {
                    options: options(&[
                        "msg(\"Hello\")",
                        "alert(\"Hello\")",
                        "prompt(\"Hello\")",
                        "log(\"Hello\")",
                    ]),
                    correct: 1,
                },
            ),
            Question::new(
                10,
                "Which event fires when an element is clicked?",
                QuestionKind::SingleChoice {
                    options: options(&["onmouseover", "change", "click", "mouseclick"]),
                    correct: 2,
                },
            ),
        ];
        Self { questions }
    }
}
