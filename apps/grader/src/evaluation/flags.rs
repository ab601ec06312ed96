//! Independent quality and integrity heuristics over raw submission text.
//!
//! Flags surface submissions for human review. False positives are expected.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::text::{count_occurrences, trimmed_len, word_count};

const ACADEMIC_MARKERS: &[&str] = &[
    "analysis",
    "analyse",
    "analyze",
    "evaluate",
    "evaluation",
    "theory",
    "evidence",
    "conclusion",
    "argument",
    "research",
];

const CASUAL_PHRASES: &[&str] = &[
    "i think",
    "in my opinion",
    "i feel",
    "i believe",
    "basically",
    "kind of",
    "sort of",
    "you know",
    "a lot of",
    "stuff",
];

/// Whole-phrase matches only, so "AI thinks" is not "i think".
static CASUAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{})\b", CASUAL_PHRASES.join("|"))).unwrap()
});

static BOILERPLATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bis defined as\b|\brefers to the\b|\baccording to (?:wikipedia|britannica|encyclopa?edia|dictionary)\b",
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub off_topic: bool,
    pub below_standard: bool,
    pub empty_or_invalid: bool,
    pub possible_misconduct: bool,
}

impl Flags {
    pub fn any(&self) -> bool {
        self.off_topic || self.below_standard || self.empty_or_invalid || self.possible_misconduct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlagThresholds {
    /// Trimmed character count below which text is empty/invalid.
    pub min_chars: usize,
    /// Word count below which text is empty/invalid.
    pub min_words: usize,
    /// Off-topic needs fewer than this many academic markers...
    pub min_academic_markers: usize,
    /// ...and fewer than this many trimmed characters.
    pub off_topic_max_chars: usize,
    /// Below-standard needs at least this many casual phrases...
    pub casual_phrase_limit: usize,
    /// ...in a text shorter than this many words.
    pub below_standard_max_words: usize,
    /// Definitional boilerplate occurrences that raise possible misconduct.
    pub boilerplate_limit: usize,
}

impl Default for FlagThresholds {
    fn default() -> Self {
        Self {
            min_chars: 50,
            min_words: 20,
            min_academic_markers: 2,
            off_topic_max_chars: 200,
            casual_phrase_limit: 5,
            below_standard_max_words: 300,
            boilerplate_limit: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlagDetector {
    thresholds: FlagThresholds,
}

impl FlagDetector {
    pub fn new(thresholds: FlagThresholds) -> Self {
        Self { thresholds }
    }

    /// Computes every flag from the raw submission text. Pure and infallible.
    pub fn detect(&self, text: &str, unit_code: &str) -> Flags {
        let t = &self.thresholds;
        let lower = text.to_lowercase();
        let chars = trimmed_len(text);
        let words = word_count(text);

        let academic_markers = count_occurrences(&lower, ACADEMIC_MARKERS);
        let casual_phrases = CASUAL_PATTERN.find_iter(text).count();
        let boilerplate = BOILERPLATE_PATTERN.find_iter(text).count();

        let flags = Flags {
            empty_or_invalid: chars < t.min_chars || words < t.min_words,
            off_topic: academic_markers < t.min_academic_markers && chars < t.off_topic_max_chars,
            below_standard: casual_phrases >= t.casual_phrase_limit
                && words < t.below_standard_max_words,
            possible_misconduct: boilerplate >= t.boilerplate_limit,
        };

        debug!(
            unit_code,
            chars, words, academic_markers, casual_phrases, boilerplate, ?flags, "flags computed"
        );
        flags
    }
}
