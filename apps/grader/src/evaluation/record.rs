//! The evaluation record returned to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluation::criteria::CriterionAchievement;
use crate::evaluation::flags::Flags;
use crate::evaluation::grade::GradeBand;
use crate::scoring::{MarkBreakdown, ScorerBackend};

/// The canonical result of one evaluation. Built once by the assembler and
/// handed to the caller; nothing keeps a reference to it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub evaluation_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub unit_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_title: Option<String>,
    pub rubric_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learner_id: Option<String>,
    pub marks: MarkBreakdown,
    pub total_score: u32,
    pub max_score: u32,
    /// One decimal place.
    pub percentage: f64,
    pub grade: GradeBand,
    pub flags: Flags,
    pub criteria_achievements: Vec<CriterionAchievement>,
    pub overall_feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// Which backend produced `marks`.
    pub scorer_backend: ScorerBackend,
    /// Why the remote scorer was not used, when it was configured but failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}
