use rand::Rng;

use super::Difficulty;

/// Terms and their definitions. Easy uses the first six, hard all eight.
pub const GLOSSARY: [(u32, &str, &str); 8] = [
    (1, "HTML", "Hypertext markup language"),
    (2, "CSS", "Cascading style sheets"),
    (3, "JavaScript", "Programming language of the web"),
    (4, "API", "Application programming interface"),
    (5, "Browser", "Program for viewing web pages"),
    (6, "Server", "Computer that provides resources"),
    (7, "Database", "Organized collection of data"),
    (8, "Frontend", "Client side of an application"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Term,
    Definition,
}

/// One face of the deck. Two cards share a `pair_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub pair_id: u32,
    pub content: String,
    pub side: Side,
}

/// Term and definition cards for the difficulty, unshuffled.
pub fn build_deck(difficulty: Difficulty) -> Vec<Card> {
    GLOSSARY
        .iter()
        .take(difficulty.pairs())
        .flat_map(|&(pair_id, term, definition)| {
            [
                Card {
                    pair_id,
                    content: term.to_string(),
                    side: Side::Term,
                },
                Card {
                    pair_id,
                    content: definition.to_string(),
                    side: Side::Definition,
                },
            ]
        })
        .collect()
}

/// Fisher–Yates: walks from the last index down to 1, swapping each slot
/// with a uniformly chosen one in `[0, i]`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
