use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::criteria::{match_criteria, same_statement, CriterionAchievement};
use crate::evaluation::feedback::synthesize_narrative;
use crate::evaluation::flags::{FlagDetector, FlagThresholds};
use crate::evaluation::grade::{grade_for, rubric_percentage};
use crate::evaluation::record::EvaluationRecord;
use crate::rubric::{extract_summative_task, Catalogue, CriterionSpec, RubricDefinition};
use crate::scoring::{
    AchievementNote, LocalHeuristicScorer, ScoredSubmission, Scorer, ScorerBackend, Submission,
};

/// Input to one evaluation, as received from the HTTP layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluationRequest {
    pub unit_code: String,
    /// Free-form rubric document. Only its SUMMATIVE TASK section is used.
    #[serde(default)]
    pub rubric_text: Option<String>,
    pub assignment_text: String,
    #[serde(default)]
    pub learner_name: Option<String>,
    #[serde(default)]
    pub learner_id: Option<String>,
    /// Per-request rubric. Validated before the evaluation starts.
    #[serde(default)]
    pub criteria: Option<Vec<CriterionSpec>>,
    #[serde(default)]
    pub rubric_id: Option<String>,
    /// Replaces the catalogue's assessment-criteria statements for the unit.
    #[serde(default)]
    pub assessment_criteria: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssemblyStage {
    Start,
    FlagsComputed,
    Scored,
    Graded,
    CriteriaMatched,
    Assembled,
}

struct Progress {
    evaluation_id: Uuid,
    stage: AssemblyStage,
}

impl Progress {
    fn start(evaluation_id: Uuid) -> Self {
        debug!(%evaluation_id, stage = ?AssemblyStage::Start, "evaluation stage");
        Self {
            evaluation_id,
            stage: AssemblyStage::Start,
        }
    }

    fn advance(&mut self, next: AssemblyStage) {
        debug!(
            evaluation_id = %self.evaluation_id,
            from = ?self.stage,
            to = ?next,
            "evaluation stage"
        );
        self.stage = next;
    }
}

/// Orchestrates one evaluation: flags, scoring with fallback, grade,
/// criteria matching and record assembly.
///
/// Holds only read-only state, so one instance serves every request.
pub struct Evaluator {
    catalogue: Arc<Catalogue>,
    remote: Option<Arc<dyn Scorer>>,
    local: LocalHeuristicScorer,
    flags: FlagDetector,
}

impl Evaluator {
    pub fn new(catalogue: Arc<Catalogue>, remote: Option<Arc<dyn Scorer>>) -> Self {
        Self {
            catalogue,
            remote,
            local: LocalHeuristicScorer,
            flags: FlagDetector::default(),
        }
    }

    pub fn with_flag_thresholds(mut self, thresholds: FlagThresholds) -> Self {
        self.flags = FlagDetector::new(thresholds);
        self
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Runs a full evaluation. Only malformed input is an error; every
    /// scoring-backend failure ends in the local fallback instead.
    pub async fn evaluate(&self, request: EvaluationRequest) -> Result<EvaluationRecord, AppError> {
        let unit_code = request.unit_code.trim();
        if unit_code.is_empty() {
            return Err(AppError::Validation("unit_code must not be empty".to_string()));
        }

        let custom_rubric = match request.criteria {
            Some(criteria) => {
                let id = request
                    .rubric_id
                    .clone()
                    .unwrap_or_else(|| format!("{unit_code}-custom"));
                Some(RubricDefinition::new(id, criteria)?)
            }
            None => None,
        };
        let rubric = custom_rubric
            .as_ref()
            .unwrap_or_else(|| self.catalogue.rubric_for(unit_code));

        let unit = self.catalogue.unit(unit_code);
        let unit_title = unit.map(|u| u.title.clone());
        let statements: Vec<String> = match request.assessment_criteria {
            Some(statements) => statements,
            None => unit
                .map(|u| u.assessment_criteria.clone())
                .unwrap_or_default(),
        };
        let task_brief = request
            .rubric_text
            .as_deref()
            .map(extract_summative_task)
            .filter(|brief| !brief.trim().is_empty());

        let text = request.assignment_text.as_str();
        let evaluation_id = Uuid::new_v4();
        let mut progress = Progress::start(evaluation_id);

        let flags = self.flags.detect(text, unit_code);
        progress.advance(AssemblyStage::FlagsComputed);

        let submission = Submission {
            text,
            rubric,
            unit_code,
            unit_title: unit_title.as_deref(),
            task_brief,
            assessment_criteria: &statements,
        };
        let (scored, scorer_backend, fallback_reason) = self.score(&submission).await;
        progress.advance(AssemblyStage::Scored);

        let percentage = rubric_percentage(&scored.marks, rubric);
        let grade = grade_for(percentage);
        progress.advance(AssemblyStage::Graded);

        let mut criteria_achievements = match_criteria(&statements, text);
        if let Some(narrative) = &scored.narrative {
            apply_achievement_notes(&mut criteria_achievements, &narrative.achievement_notes);
        }
        progress.advance(AssemblyStage::CriteriaMatched);

        let narrative = scored
            .narrative
            .unwrap_or_else(|| synthesize_narrative(&scored.marks, percentage, grade, &flags));

        let record = EvaluationRecord {
            evaluation_id,
            evaluated_at: Utc::now(),
            unit_code: unit_code.to_string(),
            unit_title,
            rubric_id: rubric.id().to_string(),
            learner_name: request.learner_name,
            learner_id: request.learner_id,
            total_score: scored.marks.total(),
            max_score: scored.marks.max_total(),
            marks: scored.marks,
            percentage,
            grade,
            flags,
            criteria_achievements,
            overall_feedback: narrative.overall_feedback,
            strengths: narrative.strengths,
            improvements: narrative.improvements,
            scorer_backend,
            fallback_reason,
        };
        progress.advance(AssemblyStage::Assembled);

        info!(
            %evaluation_id,
            unit_code = %record.unit_code,
            total = record.total_score,
            max = record.max_score,
            percentage = record.percentage,
            grade = record.grade.label(),
            backend = ?record.scorer_backend,
            flagged = record.flags.any(),
            "evaluation complete"
        );
        Ok(record)
    }

    /// Remote first when configured; any failure, or marks that do not cover
    /// the rubric exactly, drops the whole remote result for the local scorer.
    async fn score(
        &self,
        submission: &Submission<'_>,
    ) -> (ScoredSubmission, ScorerBackend, Option<String>) {
        let mut fallback_reason = None;

        if let Some(remote) = &self.remote {
            match remote.score(submission).await {
                Ok(scored) if scored.marks.matches_rubric(submission.rubric) => {
                    return (scored, remote.backend(), None);
                }
                Ok(_) => {
                    let reason = "remote marks do not match the rubric criteria".to_string();
                    warn!(unit_code = submission.unit_code, %reason, "falling back to local scorer");
                    fallback_reason = Some(reason);
                }
                Err(e) => {
                    warn!(unit_code = submission.unit_code, error = %e, "falling back to local scorer");
                    fallback_reason = Some(e.to_string());
                }
            }
        }

        let marks = self.local.score_marks(submission.text, submission.rubric);
        let scored = ScoredSubmission {
            marks,
            narrative: None,
        };
        (scored, self.local.backend(), fallback_reason)
    }
}

/// Remote text replaces the templated evidence of the statement it names.
/// Statements without a matching note keep the template, and `achieved` is
/// never taken from the remote reply.
fn apply_achievement_notes(achievements: &mut [CriterionAchievement], notes: &[AchievementNote]) {
    for achievement in achievements.iter_mut() {
        let Some(note) = notes
            .iter()
            .find(|note| same_statement(&achievement.criterion_text, &note.criterion_text))
        else {
            continue;
        };
        if !note.evidence.trim().is_empty() {
            achievement.evidence = note.evidence.clone();
        }
        if !note.improvement_suggestion.trim().is_empty() {
            achievement.improvement_suggestion = note.improvement_suggestion.clone();
        }
    }
}
