use demos_tgbot::quiz::{Advance, FeedbackTier, QuestionBank, QuizEngine};

const BANK: &str = r#"[
    {"id": 1, "prompt": "Which keyword declares a constant?", "kind": "single_choice",
     "options": ["var", "let", "const"], "correct": 2},
    {"id": 2, "prompt": "Pick the falsy values", "kind": "multi_choice",
     "options": ["0", "\"\"", "[]", "null"], "correct": [0, 1, 3]},
    {"id": 3, "prompt": "typeof null?", "kind": "free_text", "expected": "object"}
]"#;

fn engine() -> QuizEngine {
    QuizEngine::new(QuestionBank::from_reader(BANK.as_bytes()).unwrap())
}

#[test]
fn two_of_three_lands_in_the_low_tier() {
    let mut quiz = engine();
    quiz.start();

    quiz.select(2);
    assert_eq!(quiz.next(), Advance::Next { correct: true });

    // selection order does not matter, but a missing option does
    quiz.select(3);
    quiz.select(0);
    assert_eq!(quiz.next(), Advance::Next { correct: false });

    quiz.enter_text("  Object\n");
    assert_eq!(quiz.next(), Advance::Finished { correct: true });

    let outcome = quiz.outcome().unwrap();
    assert_eq!((outcome.score, outcome.total, outcome.percent), (2, 3, 67));
    assert_eq!(outcome.tier, FeedbackTier::NeedsReview);
    assert_eq!(outcome.review[1].answer, "0, null");
    assert_eq!(outcome.review[1].correct_answer.as_deref(), Some("0, \"\", null"));
    assert_eq!(outcome.review[2].answer, "Object");
}

#[test]
fn finished_session_ignores_further_input() {
    let mut quiz = engine();
    quiz.start();
    quiz.select(0);
    quiz.next();
    quiz.select(0);
    quiz.next();
    quiz.enter_text("x");
    quiz.next();

    assert!(!quiz.select(1));
    assert!(!quiz.enter_text("object"));
    assert_eq!(quiz.next(), Advance::Blocked);
    assert_eq!(quiz.answers().len(), 3);
}

#[test]
fn draft_is_cleared_between_questions() {
    let mut quiz = engine();
    quiz.start();
    quiz.select(2);
    quiz.next();

    assert!(!quiz.can_advance());
    assert_eq!(quiz.answers().len(), quiz.pointer());
}
