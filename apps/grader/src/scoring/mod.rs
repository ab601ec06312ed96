//! Scoring backends: trait-based scorers that turn a submission
//! and a rubric into a per-criterion `MarkBreakdown`.
//!
//! Default: `LocalHeuristicScorer` (pure-Rust, offline, deterministic, never fails).
//! Optional: `RemoteAiScorer` (delegates to the LLM client, validated and clamped).
//!
//! The assembler holds an `Option<Arc<dyn Scorer>>` for the remote backend and
//! always falls back to the local one.

pub mod extract;
pub mod heuristic;
pub mod marks;
pub mod prompts;
pub mod remote;

pub use heuristic::LocalHeuristicScorer;
pub use marks::{CriterionResult, MarkBreakdown};
pub use remote::RemoteAiScorer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::rubric::RubricDefinition;

/// Failure of a scoring backend. Always recoverable: the assembler absorbs it
/// and switches to the local scorer.
#[derive(Debug, Error)]
pub enum ScoringBackendError {
    #[error("remote scorer call failed: {0}")]
    Transport(#[from] LlmError),

    #[error("remote scorer timed out after {0}s")]
    Timeout(u64),

    #[error("malformed scorer response: {0}")]
    Malformed(String),

    #[error("scorer response is missing '{0}'")]
    MissingKey(String),
}

/// Which backend produced the marks of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerBackend {
    RemoteAi,
    LocalHeuristic,
}

/// Everything a scorer may look at for one submission.
#[derive(Debug, Clone, Copy)]
pub struct Submission<'a> {
    pub text: &'a str,
    pub rubric: &'a RubricDefinition,
    pub unit_code: &'a str,
    pub unit_title: Option<&'a str>,
    /// Task brief extracted from the rubric document, if one was supplied.
    pub task_brief: Option<&'a str>,
    pub assessment_criteria: &'a [String],
}

/// Narrative feedback returned by the remote scorer alongside its marks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Narrative {
    pub overall_feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// Per-statement text, keyed by the statement it was written for.
    pub achievement_notes: Vec<AchievementNote>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AchievementNote {
    /// Statement as echoed by the backend; may be abbreviated.
    pub criterion_text: String,
    pub evidence: String,
    pub improvement_suggestion: String,
}

/// Output of a successful scoring call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSubmission {
    pub marks: MarkBreakdown,
    /// Present only for backends that write their own feedback.
    pub narrative: Option<Narrative>,
}

/// The scorer trait. Implement this to add a backend without touching the
/// assembler or the HTTP layer.
#[async_trait]
pub trait Scorer: Send + Sync {
    fn backend(&self) -> ScorerBackend;

    async fn score(
        &self,
        submission: &Submission<'_>,
    ) -> Result<ScoredSubmission, ScoringBackendError>;
}
