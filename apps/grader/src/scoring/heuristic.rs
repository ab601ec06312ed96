//! Local heuristic scorer: offline, deterministic, always available.
//!
//! Algorithm, per criterion family:
//! - Content: one point per `WORDS_PER_CONTENT_POINT` words, capped at max.
//! - Theory: `max / 4` base plus `KEYWORD_BONUS` per domain-signal keyword.
//! - Referencing: `max / 4` base plus `KEYWORD_BONUS` per URL and citation.
//! - Presentation: four tiers of average words per non-empty line.
//!
//! Every score is then mapped to one of four canned justifications, so the
//! same text and rubric always produce the same `MarkBreakdown`.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::rubric::{CriterionFamily, CriterionSpec, RubricDefinition};
use crate::scoring::{
    CriterionResult, MarkBreakdown, ScoredSubmission, Scorer, ScorerBackend, ScoringBackendError,
    Submission,
};
use crate::text::{count_occurrences, word_count};

const WORDS_PER_CONTENT_POINT: usize = 40;
const KEYWORD_BONUS: u32 = 2;

const THEORY_KEYWORDS: &[&str] = &["theory", "framework", "model", "research", "literature"];

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").unwrap());

/// A parenthesised span holding a four-digit year, or "(n.d.)".
static CITATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\([^()]*(?:\b\d{4}[a-z]?\b|\bn\.d\.)[^()]*\)").unwrap()
});

/// Upper bounds (exclusive) on words-per-line for the lower presentation tiers.
const PRESENTATION_TIERS: [(f64, u32, u32); 3] = [(5.0, 1, 4), (12.0, 1, 2), (20.0, 3, 4)];

/// Pure-Rust text-statistics scorer. Fast, deterministic, no external call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalHeuristicScorer;

/// Text statistics computed once per submission.
struct TextStats {
    words: usize,
    theory_hits: usize,
    reference_hits: usize,
    words_per_line: f64,
}

impl TextStats {
    fn collect(text: &str) -> Self {
        let lower = text.to_lowercase();
        let words = word_count(text);

        let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
        let words_per_line = if lines == 0 {
            0.0
        } else {
            words as f64 / lines as f64
        };

        Self {
            words,
            theory_hits: count_occurrences(&lower, THEORY_KEYWORDS),
            reference_hits: URL_PATTERN.find_iter(text).count()
                + CITATION_PATTERN.find_iter(text).count(),
            words_per_line,
        }
    }
}

impl LocalHeuristicScorer {
    /// Scores every rubric criterion. Never fails.
    pub fn score_marks(&self, text: &str, rubric: &RubricDefinition) -> MarkBreakdown {
        let stats = TextStats::collect(text);
        MarkBreakdown::from_rubric(rubric, |spec| {
            let score = if stats.words == 0 {
                0
            } else {
                score_criterion(spec, &stats)
            };
            CriterionResult::new(score, spec.max_score, band_justification(score, spec.max_score))
        })
    }
}

#[async_trait]
impl Scorer for LocalHeuristicScorer {
    fn backend(&self) -> ScorerBackend {
        ScorerBackend::LocalHeuristic
    }

    async fn score(
        &self,
        submission: &Submission<'_>,
    ) -> Result<ScoredSubmission, ScoringBackendError> {
        Ok(ScoredSubmission {
            marks: self.score_marks(submission.text, submission.rubric),
            narrative: None,
        })
    }
}

fn score_criterion(spec: &CriterionSpec, stats: &TextStats) -> u32 {
    let max = spec.max_score;
    let raw = match spec.family() {
        CriterionFamily::Content => (stats.words / WORDS_PER_CONTENT_POINT) as u64,
        CriterionFamily::Theory => keyword_score(max, stats.theory_hits),
        CriterionFamily::Referencing => keyword_score(max, stats.reference_hits),
        CriterionFamily::Presentation => presentation_score(max, stats.words_per_line) as u64,
    };
    raw.min(max as u64) as u32
}

fn keyword_score(max: u32, hits: usize) -> u64 {
    (max / 4) as u64 + hits as u64 * KEYWORD_BONUS as u64
}

fn presentation_score(max: u32, words_per_line: f64) -> u32 {
    PRESENTATION_TIERS
        .iter()
        .find(|(limit, _, _)| words_per_line < *limit)
        .map(|(_, num, den)| max * num / den)
        .unwrap_or(max)
}

/// Canned justification for a score, banded on score / max.
pub fn band_justification(score: u32, max: u32) -> &'static str {
    // Integer comparisons keep the banding exact at the thresholds.
    let (score, max) = (score as u64, max as u64);
    if score * 10 >= max * 8 {
        "Work is consistently strong against this criterion."
    } else if score * 10 >= max * 6 {
        "Work meets most expectations for this criterion."
    } else if score * 10 >= max * 4 {
        "Shows partial achievement of this criterion; further development is needed."
    } else {
        "There is limited evidence of this criterion being met."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::Catalogue;

    fn plain_words(n: usize) -> String {
        (0..n).map(|_| "word").collect::<Vec<_>>().join(" ")
    }

    fn rubric(criteria: Vec<CriterionSpec>) -> RubricDefinition {
        RubricDefinition::new("test", criteria).unwrap()
    }

    #[test]
    fn test_content_scales_with_word_count() {
        let r = rubric(vec![CriterionSpec::new("Content", 50)]);
        let marks = LocalHeuristicScorer.score_marks(&plain_words(40), &r);
        assert_eq!(marks.get("Content").unwrap().score(), 1);

        let marks = LocalHeuristicScorer.score_marks(&plain_words(400), &r);
        assert_eq!(marks.get("Content").unwrap().score(), 10);
    }

    #[test]
    fn test_content_capped_at_max() {
        let r = rubric(vec![CriterionSpec::new("Content", 5)]);
        let marks = LocalHeuristicScorer.score_marks(&plain_words(4000), &r);
        assert_eq!(marks.get("Content").unwrap().score(), 5);
    }

    #[test]
    fn test_theory_base_without_keywords() {
        let r = rubric(vec![CriterionSpec::new("Theory", 40)]);
        let marks = LocalHeuristicScorer.score_marks(&plain_words(40), &r);
        assert_eq!(marks.get("Theory").unwrap().score(), 10);
    }

    #[test]
    fn test_theory_keyword_bonus() {
        let r = rubric(vec![CriterionSpec::new("Theory", 40)]);
        let text = "This research applies a framework and a model from the literature.";
        let marks = LocalHeuristicScorer.score_marks(text, &r);
        // base 10 + 4 hits * 2
        assert_eq!(marks.get("Theory").unwrap().score(), 18);
    }

    #[test]
    fn test_referencing_counts_urls_and_citations() {
        let r = rubric(vec![CriterionSpec::new("Referencing", 20)]);
        let text = "AI is growing (Smith, 2020). See http://example.com and (Jones 2019) \
                    as well as (WHO, n.d.). Not a citation (see above).";
        let marks = LocalHeuristicScorer.score_marks(text, &r);
        // base 5 + (1 url + 3 citations) * 2
        assert_eq!(marks.get("Referencing").unwrap().score(), 13);
    }

    #[test]
    fn test_presentation_tiers() {
        let r = rubric(vec![CriterionSpec::new("Presentation", 20)]);
        let sparse = "one two\nthree four\nfive six";
        let dense = plain_words(60);
        let mid = format!("{}\n{}", plain_words(8), plain_words(8));
        let high = format!("{}\n{}", plain_words(15), plain_words(15));

        let score = |t: &str| {
            LocalHeuristicScorer
                .score_marks(t, &r)
                .get("Presentation")
                .unwrap()
                .score()
        };
        assert_eq!(score(sparse), 5);
        assert_eq!(score(&mid), 10);
        assert_eq!(score(&high), 15);
        assert_eq!(score(&dense), 20);
    }

    #[test]
    fn test_empty_text_scores_zero_everywhere() {
        let r = rubric(vec![
            CriterionSpec::new("Content", 50),
            CriterionSpec::new("Theory", 40),
            CriterionSpec::new("Referencing", 10),
        ]);
        let marks = LocalHeuristicScorer.score_marks("   ", &r);
        assert_eq!(marks.total(), 0);
        assert_eq!(marks.iter().count(), 3);
    }

    #[test]
    fn test_scores_never_exceed_max() {
        let r = rubric(vec![
            CriterionSpec::new("Content", 3),
            CriterionSpec::new("Theory", 3),
            CriterionSpec::new("Referencing", 3),
            CriterionSpec::new("Presentation", 3),
        ]);
        let text = format!(
            "{} theory theory model framework http://a.b (A, 2001) (B, 2002)",
            plain_words(1000)
        );
        let marks = LocalHeuristicScorer.score_marks(&text, &r);
        for (_, result) in marks.iter() {
            assert!(result.score() <= result.max_score());
        }
    }

    #[test]
    fn test_deterministic_output() {
        let r = Catalogue::builtin().unwrap().default_rubric;
        let text = "Research on theory (Smith, 2020).\nA model of the framework is given here.";
        let a = serde_json::to_string(&LocalHeuristicScorer.score_marks(text, &r)).unwrap();
        let b = serde_json::to_string(&LocalHeuristicScorer.score_marks(text, &r)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_band_justification_thresholds() {
        assert!(band_justification(8, 10).contains("consistently strong"));
        assert!(band_justification(6, 10).contains("meets most expectations"));
        assert!(band_justification(4, 10).contains("partial achievement"));
        assert!(band_justification(3, 10).contains("limited evidence"));
        assert!(band_justification(0, 10).contains("limited evidence"));
    }

    #[tokio::test]
    async fn test_trait_impl_never_fails() {
        let r = rubric(vec![CriterionSpec::new("Content", 10)]);
        let submission = Submission {
            text: "",
            rubric: &r,
            unit_code: "U1",
            unit_title: None,
            task_brief: None,
            assessment_criteria: &[],
        };
        let scored = LocalHeuristicScorer.score(&submission).await.unwrap();
        assert!(scored.narrative.is_none());
        assert_eq!(LocalHeuristicScorer.backend(), ScorerBackend::LocalHeuristic);
    }
}
