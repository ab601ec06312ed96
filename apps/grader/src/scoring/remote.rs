//! Remote AI scorer. Delegates marking to the LLM client and validates the
//! reply against a strict JSON contract.
//!
//! Any failure (timeout, transport, unparseable text, missing keys) comes back
//! as a `ScoringBackendError`; nothing from a failed call is returned. Scores
//! that parse are clamped to `[0, max_score]` before they leave this module.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, SCORE_BOUNDS_INSTRUCTION};
use crate::llm_client::Completion;
use crate::rubric::{CriterionSpec, RubricDefinition};
use crate::scoring::extract::{extract_json_object, JsonExtraction};
use crate::scoring::prompts::{SCORING_PROMPT_TEMPLATE, SCORING_SYSTEM};
use crate::scoring::{
    AchievementNote, CriterionResult, MarkBreakdown, Narrative, ScoredSubmission, Scorer,
    ScorerBackend, ScoringBackendError, Submission,
};

/// Top-level keys every response must carry besides `scores`.
const REQUIRED_NARRATIVE_KEYS: &[&str] = &["overall_feedback", "strengths", "improvements"];

pub struct RemoteAiScorer {
    llm: Arc<dyn Completion>,
    timeout: Duration,
}

impl RemoteAiScorer {
    pub fn new(llm: Arc<dyn Completion>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }
}

#[async_trait]
impl Scorer for RemoteAiScorer {
    fn backend(&self) -> ScorerBackend {
        ScorerBackend::RemoteAi
    }

    async fn score(
        &self,
        submission: &Submission<'_>,
    ) -> Result<ScoredSubmission, ScoringBackendError> {
        let prompt = build_scoring_prompt(submission);

        let text = tokio::time::timeout(self.timeout, self.llm.complete(&prompt, SCORING_SYSTEM))
            .await
            .map_err(|_| ScoringBackendError::Timeout(self.timeout.as_secs()))??;

        let scored = parse_scoring_response(&text, submission.rubric)?;
        info!(
            "Remote scorer marked unit {}: {}/{}",
            submission.unit_code,
            scored.marks.total(),
            scored.marks.max_total()
        );
        Ok(scored)
    }
}

#[derive(Debug, Deserialize)]
struct RemoteNarrative {
    overall_feedback: String,
    strengths: Vec<String>,
    improvements: Vec<String>,
    #[serde(default)]
    criteria_achievements: Vec<RemoteAchievement>,
}

#[derive(Debug, Deserialize)]
struct RemoteAchievement {
    #[serde(default)]
    criterion_text: String,
    #[serde(default)]
    evidence: String,
    #[serde(default)]
    improvement_suggestion: String,
}

/// Parses raw model text into marks and narrative, validating every key and
/// clamping every score.
pub fn parse_scoring_response(
    text: &str,
    rubric: &RubricDefinition,
) -> Result<ScoredSubmission, ScoringBackendError> {
    let value = match extract_json_object(text) {
        JsonExtraction::Parsed(value) => value,
        JsonExtraction::ParseError(reason) => return Err(ScoringBackendError::Malformed(reason)),
    };

    let scores = value
        .get("scores")
        .and_then(Value::as_object)
        .ok_or_else(|| ScoringBackendError::MissingKey("scores".to_string()))?;

    let marks = MarkBreakdown::try_from_rubric(rubric, |spec| clamp_entry(scores, spec))?;

    if let Some(key) = REQUIRED_NARRATIVE_KEYS
        .iter()
        .find(|key| value.get(**key).is_none())
    {
        return Err(ScoringBackendError::MissingKey(key.to_string()));
    }

    let narrative: RemoteNarrative = serde_json::from_value(value)
        .map_err(|e| ScoringBackendError::Malformed(e.to_string()))?;

    Ok(ScoredSubmission {
        marks,
        narrative: Some(Narrative {
            overall_feedback: narrative.overall_feedback,
            strengths: narrative.strengths,
            improvements: narrative.improvements,
            achievement_notes: narrative
                .criteria_achievements
                .into_iter()
                .map(|a| AchievementNote {
                    criterion_text: a.criterion_text,
                    evidence: a.evidence,
                    improvement_suggestion: a.improvement_suggestion,
                })
                .collect(),
        }),
    })
}

fn clamp_entry(
    scores: &Map<String, Value>,
    spec: &CriterionSpec,
) -> Result<CriterionResult, ScoringBackendError> {
    let entry = lookup_criterion(scores, &spec.name)
        .ok_or_else(|| ScoringBackendError::MissingKey(format!("scores.{}", spec.name)))?;

    let (raw, justification) = match entry {
        Value::Object(fields) => (
            fields
                .get("score")
                .ok_or_else(|| ScoringBackendError::MissingKey(format!("scores.{}.score", spec.name)))?,
            fields
                .get("justification")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        ),
        other => (other, ""),
    };

    let raw = numeric(raw).ok_or_else(|| {
        ScoringBackendError::Malformed(format!("score for '{}' is not a number", spec.name))
    })?;

    let clamped = raw.round().clamp(0.0, spec.max_score as f64) as u32;
    if (clamped as f64 - raw).abs() > f64::EPSILON {
        debug!(
            "Clamped remote score for '{}' from {} to {}",
            spec.name, raw, clamped
        );
    }

    Ok(CriterionResult::new(clamped, spec.max_score, justification))
}

/// Exact key first, then a trimmed case-insensitive match.
fn lookup_criterion<'a>(scores: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    scores.get(name).or_else(|| {
        scores
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(name.trim()))
            .map(|(_, value)| value)
    })
}

fn numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Builds the scoring prompt by filling the template with the submission context.
fn build_scoring_prompt(submission: &Submission<'_>) -> String {
    let rubric_json = Value::Array(
        submission
            .rubric
            .criteria()
            .iter()
            .map(|c| json!({"criterion": c.name, "max_score": c.max_score}))
            .collect(),
    )
    .to_string();

    let criteria_json = json!(submission.assessment_criteria).to_string();

    let unit = match submission.unit_title {
        Some(title) => format!("{} ({})", submission.unit_code, title),
        None => submission.unit_code.to_string(),
    };

    fill_template(
        SCORING_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_SYSTEM),
            ("score_bounds", SCORE_BOUNDS_INSTRUCTION),
            ("unit", unit.as_str()),
            ("rubric_json", rubric_json.as_str()),
            ("task_brief", submission.task_brief.unwrap_or("(not provided)")),
            ("criteria_json", criteria_json.as_str()),
            ("submission", submission.text),
        ],
    )
}

/// Replaces each `{name}` placeholder in one pass over the template.
/// Substituted values are never rescanned, and unknown braces are kept.
fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_brace = &rest[open + 1..];
        let hit = vars.iter().find_map(|(name, value)| {
            let tail = after_brace.strip_prefix(name)?.strip_prefix('}')?;
            Some((*value, tail))
        });
        match hit {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after_brace;
            }
        }
    }
    out.push_str(rest);
    out
}
