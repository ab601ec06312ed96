//! Criteria achievement matcher. Each assessment-criteria statement is
//! achieved only when every one of its key terms appears in the submission.

use serde::{Deserialize, Serialize};

/// Number of leading content words taken from a statement.
const KEY_TERM_LIMIT: usize = 3;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "of", "and", "or", "to", "for", "in", "on", "with", "by", "how", "what",
    "its", "their", "your",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionAchievement {
    pub criterion_text: String,
    pub achieved: bool,
    pub evidence: String,
    pub improvement_suggestion: String,
}

/// Leading content words of a statement, lower-cased, skipping numbering
/// tokens such as "2.1" and stop words.
pub fn key_terms(statement: &str) -> Vec<String> {
    statement
        .split_whitespace()
        .map(|token| {
            token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .filter(|token| !is_numbering(token))
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .take(KEY_TERM_LIMIT)
        .collect()
}

fn is_numbering(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Leading "2.1"-style token of a statement, without trailing punctuation.
fn numbering(statement: &str) -> Option<&str> {
    let first = statement
        .split_whitespace()
        .next()?
        .trim_end_matches(['.', ':', ')']);
    (first.chars().any(|c| c.is_ascii_digit()) && is_numbering(first)).then_some(first)
}

/// Lower-cased words after any numbering, with a trailing ellipsis dropped.
fn normalized_words(statement: &str) -> String {
    let mut words = statement.split_whitespace().peekable();
    if words.peek().is_some_and(|w| numbering(w).is_some()) {
        words.next();
    }
    let joined = words.collect::<Vec<_>>().join(" ").to_lowercase();
    joined
        .trim_end_matches(|c: char| c == '.' || c == '\u{2026}' || c.is_whitespace())
        .to_string()
}

/// True when `echoed` refers to `statement`. Numbered statements match on
/// their numbering; otherwise the echoed words must equal or lead the
/// statement's words.
pub fn same_statement(statement: &str, echoed: &str) -> bool {
    if let (Some(a), Some(b)) = (numbering(statement), numbering(echoed)) {
        return a == b;
    }
    let statement = normalized_words(statement);
    let echoed = normalized_words(echoed);
    !echoed.is_empty()
        && (statement == echoed || statement.starts_with(&format!("{echoed} ")))
}

/// One achievement per statement, in the given order.
pub fn match_criteria(statements: &[String], text: &str) -> Vec<CriterionAchievement> {
    let lower = text.to_lowercase();
    statements
        .iter()
        .map(|statement| match_statement(statement, &lower))
        .collect()
}

fn match_statement(statement: &str, text_lower: &str) -> CriterionAchievement {
    let terms = key_terms(statement);
    let missing: Vec<&str> = terms
        .iter()
        .map(String::as_str)
        .filter(|term| !text_lower.contains(term))
        .collect();
    let achieved = !terms.is_empty() && missing.is_empty();

    let (evidence, improvement_suggestion) = if achieved {
        (
            format!(
                "The submission addresses every key term of this criterion ({}).",
                terms.join(", ")
            ),
            "Deepen the discussion with applied examples and supporting sources.".to_string(),
        )
    } else if terms.is_empty() {
        (
            "No key terms could be derived from this criterion statement.".to_string(),
            format!("Address '{statement}' explicitly."),
        )
    } else {
        (
            format!(
                "Key terms not evidenced in the submission: {}.",
                missing.join(", ")
            ),
            format!(
                "Address '{statement}' explicitly, covering: {}.",
                missing.join(", ")
            ),
        )
    };

    CriterionAchievement {
        criterion_text: statement.to_string(),
        achieved,
        evidence,
        improvement_suggestion,
    }
}
