//! Heuristic flashcard generation used when no model is available.
//!
//! Deterministic apart from card ids: sentences become cloze cards with
//! their longest word blanked, or plain questions when no word qualifies.

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;

use super::{CardSource, GeneratedCard, GeneratedDeck, Generator};
use crate::domain::CardType;
use crate::error::Result;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid sentence end regex"));
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("valid non-word regex"));
static SUMMARY_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[•\-*\d.]+\s*").expect("valid summary marker regex"));
static LINE_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[#*\-\d.]+\s*").expect("valid line marker regex"));

pub const BLANK: &str = "_____";
const GENERIC_DECK_NAMES: [&str; 3] = ["Study Notes", "Flashcard Deck", "Learning Material"];
const QUESTION_EXCERPT_CHARS: usize = 80;

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFallbackGenerator;

impl LocalFallbackGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Build a deck from `text` without any I/O
    pub fn build(&self, text: &str, max_items: usize) -> GeneratedDeck {
        let clean = WHITESPACE.replace_all(text, " ");
        let sentences = split_sentences(clean.trim());

        let bullet_count = (max_items / 2).clamp(3, 8);
        let summary = if sentences.is_empty() {
            "- Summary unavailable.".to_string()
        } else {
            sentences
                .iter()
                .take(bullet_count)
                .map(|s| format!("- {}", s))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let stamp = Utc::now().timestamp_millis();
        let flashcards = sentences
            .iter()
            .take(max_items)
            .enumerate()
            .map(|(i, sentence)| card_from_sentence(format!("local-{}-{}", stamp, i), sentence))
            .collect();

        let deck_name_suggestions = fallback_deck_names(&summary, text);
        GeneratedDeck {
            summary,
            flashcards,
            deck_name_suggestions,
        }
    }
}

#[async_trait]
impl Generator for LocalFallbackGenerator {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn generate(&self, text: &str, max_items: usize) -> Result<GeneratedDeck> {
        Ok(self.build(text, max_items))
    }
}

/// Split after `.`, `!` or `?` followed by whitespace, keeping the mark
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        // The punctuation mark is a single ASCII byte
        sentences.push(text[start..m.start() + 1].trim());
        start = m.end();
    }
    sentences.push(text[start..].trim());
    sentences.retain(|s| !s.is_empty());
    sentences
}

/// Longest word over four characters, the earliest one on ties
fn pick_cloze_word(sentence: &str) -> Option<String> {
    let stripped = NON_WORD.replace_all(sentence, "");
    let mut best: Option<&str> = None;
    for word in stripped.split_whitespace() {
        let len = word.chars().count();
        if len > 4 && best.is_none_or(|b| len > b.chars().count()) {
            best = Some(word);
        }
    }
    best.map(str::to_string)
}

/// Blank the first case-insensitive occurrence of `word`
fn blank_out(sentence: &str, word: &str) -> Option<String> {
    let pattern = Regex::new(&format!("(?i){}", regex::escape(word))).ok()?;
    pattern
        .is_match(sentence)
        .then(|| pattern.replace(sentence, BLANK).into_owned())
}

fn card_from_sentence(id: String, sentence: &str) -> GeneratedCard {
    let source = Some(CardSource {
        page: None,
        text: Some(sentence.to_string()),
    });

    let cloze = pick_cloze_word(sentence)
        .and_then(|word| blank_out(sentence, &word).map(|question| (question, word)));

    match cloze {
        Some((question, answer)) => GeneratedCard {
            id,
            card_type: CardType::Cloze,
            question,
            answer,
            source,
        },
        None => {
            let excerpt: String = sentence.chars().take(QUESTION_EXCERPT_CHARS).collect();
            GeneratedCard {
                id,
                card_type: CardType::Qa,
                question: format!("What is a key detail from: \"{}\"?", excerpt),
                answer: sentence.to_string(),
                source,
            }
        }
    }
}

/// First four words of a line, if they make a usable deck name
fn name_candidate(line: &str) -> Option<String> {
    let words = line.split_whitespace().take(4).collect::<Vec<_>>().join(" ");
    let len = words.chars().count();
    (len > 5 && len < 50 && !words.contains('?')).then_some(words)
}

/// Deck names derived from the summary, then from the opening lines of the
/// text, or generic names when neither yields anything.
pub fn fallback_deck_names(summary: &str, raw_text: &str) -> Vec<String> {
    let mut names: Vec<String> = summary
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(3)
        .filter_map(|l| name_candidate(&SUMMARY_MARKER.replace(l, "")))
        .collect();

    if names.len() < 3 {
        for line in raw_text
            .lines()
            .filter(|l| l.trim().chars().count() > 10)
            .take(5)
        {
            if let Some(name) = name_candidate(&LINE_MARKER.replace(line.trim(), "")) {
                names.push(name);
            }
            if names.len() >= 3 {
                break;
            }
        }
    }

    let mut unique: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }

    if unique.is_empty() {
        return GENERIC_DECK_NAMES.iter().map(|n| n.to_string()).collect();
    }
    unique.truncate(5);
    unique
}
