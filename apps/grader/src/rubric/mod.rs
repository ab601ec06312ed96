//! Rubric model: criteria, maximum scores, optional weights and the
//! per-unit assessment-criteria catalogue.
//!
//! A `RubricDefinition` can only be obtained through validation (either
//! `RubricDefinition::new` or deserialization), so every rubric the engine
//! sees already satisfies the weight and max-score invariants.

pub mod catalogue;
pub mod task;

pub use catalogue::{Catalogue, UnitSpec};
pub use task::extract_summative_task;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance used when checking that criterion weights sum to 1.0.
pub const WEIGHT_EPSILON: f64 = 0.001;

#[derive(Debug, Error, PartialEq)]
pub enum RubricError {
    #[error("rubric '{0}' has no criteria")]
    Empty(String),

    #[error("criterion name cannot be blank")]
    BlankName,

    #[error("criterion '{0}' appears more than once")]
    DuplicateCriterion(String),

    #[error("criterion '{0}' must have a positive max_score")]
    ZeroMaxScore(String),

    #[error("criterion '{criterion}' has weight {weight} outside [0, 1]")]
    WeightOutOfRange { criterion: String, weight: f64 },

    #[error("either every criterion carries a weight or none does")]
    MixedWeights,

    #[error("criterion weights sum to {0:.3}, expected 1.0")]
    WeightSum(f64),
}

/// How the local heuristic scorer treats a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionFamily {
    /// Content, understanding or analysis. Scales with length.
    Content,
    /// Theory and application. Rewards domain-signal keywords.
    Theory,
    /// Referencing. Rewards URLs and parenthetical citations.
    Referencing,
    /// Presentation. Rewards line density.
    Presentation,
}

impl CriterionFamily {
    /// Infers the family from a criterion name.
    pub fn infer(name: &str) -> Self {
        let name = name.to_lowercase();
        let has_any = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

        if has_any(&["theor", "application", "framework"]) {
            CriterionFamily::Theory
        } else if has_any(&["referenc", "citation", "source"]) {
            CriterionFamily::Referencing
        } else if has_any(&["presentation", "structure", "format", "writing"]) {
            CriterionFamily::Presentation
        } else {
            CriterionFamily::Content
        }
    }
}

/// A single named criterion with its maximum score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionSpec {
    pub name: String,
    pub max_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Explicit scoring family. Inferred from `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<CriterionFamily>,
}

impl CriterionSpec {
    pub fn new(name: impl Into<String>, max_score: u32) -> Self {
        Self {
            name: name.into(),
            max_score,
            weight: None,
            family: None,
        }
    }

    #[cfg(test)]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    #[cfg(test)]
    pub fn with_family(mut self, family: CriterionFamily) -> Self {
        self.family = Some(family);
        self
    }

    pub fn family(&self) -> CriterionFamily {
        self.family
            .unwrap_or_else(|| CriterionFamily::infer(&self.name))
    }
}

/// Serialized shape of a rubric. Deserialization of `RubricDefinition`
/// goes through this type so invalid documents are rejected at load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricDocument {
    id: String,
    criteria: Vec<CriterionSpec>,
}

/// An ordered, validated set of scoring criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RubricDocument", into = "RubricDocument")]
pub struct RubricDefinition {
    id: String,
    criteria: Vec<CriterionSpec>,
}

impl RubricDefinition {
    pub fn new(id: impl Into<String>, criteria: Vec<CriterionSpec>) -> Result<Self, RubricError> {
        let id = id.into();
        validate_criteria(&id, &criteria)?;
        Ok(Self { id, criteria })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn criteria(&self) -> &[CriterionSpec] {
        &self.criteria
    }

    /// Sum of every criterion's `max_score`.
    pub fn max_total(&self) -> u32 {
        self.criteria.iter().map(|c| c.max_score).sum()
    }

    /// True when the rubric uses weights (validation guarantees all-or-none).
    pub fn is_weighted(&self) -> bool {
        self.criteria.iter().all(|c| c.weight.is_some())
    }
}

impl TryFrom<RubricDocument> for RubricDefinition {
    type Error = RubricError;

    fn try_from(doc: RubricDocument) -> Result<Self, Self::Error> {
        RubricDefinition::new(doc.id, doc.criteria)
    }
}

impl From<RubricDefinition> for RubricDocument {
    fn from(rubric: RubricDefinition) -> Self {
        RubricDocument {
            id: rubric.id,
            criteria: rubric.criteria,
        }
    }
}

fn validate_criteria(id: &str, criteria: &[CriterionSpec]) -> Result<(), RubricError> {
    if criteria.is_empty() {
        return Err(RubricError::Empty(id.to_string()));
    }

    let mut seen: Vec<String> = Vec::with_capacity(criteria.len());
    for criterion in criteria {
        if criterion.name.trim().is_empty() {
            return Err(RubricError::BlankName);
        }
        let key = criterion.name.trim().to_lowercase();
        if seen.contains(&key) {
            return Err(RubricError::DuplicateCriterion(criterion.name.clone()));
        }
        seen.push(key);

        if criterion.max_score == 0 {
            return Err(RubricError::ZeroMaxScore(criterion.name.clone()));
        }
        if let Some(weight) = criterion.weight {
            if !(0.0..=1.0).contains(&weight) {
                return Err(RubricError::WeightOutOfRange {
                    criterion: criterion.name.clone(),
                    weight,
                });
            }
        }
    }

    let weighted = criteria.iter().filter(|c| c.weight.is_some()).count();
    if weighted == 0 {
        return Ok(());
    }
    if weighted != criteria.len() {
        return Err(RubricError::MixedWeights);
    }

    let sum: f64 = criteria.iter().filter_map(|c| c.weight).sum();
    if (sum - 1.0).abs() > WEIGHT_EPSILON {
        return Err(RubricError::WeightSum(sum));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_inference_from_names() {
        assert_eq!(
            CriterionFamily::infer("Theory & Application"),
            CriterionFamily::Theory
        );
        assert_eq!(
            CriterionFamily::infer("Referencing"),
            CriterionFamily::Referencing
        );
        assert_eq!(
            CriterionFamily::infer("Presentation & Structure"),
            CriterionFamily::Presentation
        );
        assert_eq!(
            CriterionFamily::infer("Knowledge & Understanding"),
            CriterionFamily::Content
        );
        assert_eq!(
            CriterionFamily::infer("Critical Analysis"),
            CriterionFamily::Content
        );
    }

    #[test]
    fn test_explicit_family_overrides_inference() {
        let c = CriterionSpec::new("Sources", 10).with_family(CriterionFamily::Content);
        assert_eq!(c.family(), CriterionFamily::Content);
    }

    #[test]
    fn test_valid_unweighted_rubric() {
        let rubric = RubricDefinition::new(
            "r1",
            vec![CriterionSpec::new("Content", 50), CriterionSpec::new("Theory", 40)],
        )
        .unwrap();
        assert_eq!(rubric.max_total(), 90);
        assert!(!rubric.is_weighted());
        assert_eq!(rubric.criteria()[1].max_score, 40);
    }

    #[test]
    fn test_empty_rubric_rejected() {
        assert_eq!(
            RubricDefinition::new("r1", vec![]),
            Err(RubricError::Empty("r1".to_string()))
        );
    }

    #[test]
    fn test_duplicate_names_rejected_case_insensitively() {
        let err = RubricDefinition::new(
            "r1",
            vec![CriterionSpec::new("Content", 10), CriterionSpec::new("content", 10)],
        )
        .unwrap_err();
        assert_eq!(err, RubricError::DuplicateCriterion("content".to_string()));
    }

    #[test]
    fn test_zero_max_score_rejected() {
        let err = RubricDefinition::new("r1", vec![CriterionSpec::new("Content", 0)]).unwrap_err();
        assert_eq!(err, RubricError::ZeroMaxScore("Content".to_string()));
    }

    #[test]
    fn test_mixed_weights_rejected() {
        let err = RubricDefinition::new(
            "r1",
            vec![
                CriterionSpec::new("Content", 10).with_weight(1.0),
                CriterionSpec::new("Theory", 10),
            ],
        )
        .unwrap_err();
        assert_eq!(err, RubricError::MixedWeights);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let err = RubricDefinition::new(
            "r1",
            vec![
                CriterionSpec::new("Content", 10).with_weight(0.5),
                CriterionSpec::new("Theory", 10).with_weight(0.3),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, RubricError::WeightSum(_)));

        let ok = RubricDefinition::new(
            "r1",
            vec![
                CriterionSpec::new("Content", 10).with_weight(0.6),
                CriterionSpec::new("Theory", 10).with_weight(0.4),
            ],
        )
        .unwrap();
        assert!(ok.is_weighted());
    }

    #[test]
    fn test_weight_out_of_range_rejected() {
        let err = RubricDefinition::new(
            "r1",
            vec![CriterionSpec::new("Content", 10).with_weight(1.5)],
        )
        .unwrap_err();
        assert!(matches!(err, RubricError::WeightOutOfRange { .. }));
    }

    #[test]
    fn test_deserialization_validates() {
        let bad = r#"{"id": "r1", "criteria": []}"#;
        assert!(serde_json::from_str::<RubricDefinition>(bad).is_err());

        let good = r#"{
            "id": "r1",
            "criteria": [
                {"name": "Content", "max_score": 50},
                {"name": "Sources", "max_score": 10, "family": "referencing"}
            ]
        }"#;
        let rubric: RubricDefinition = serde_json::from_str(good).unwrap();
        assert_eq!(rubric.criteria().len(), 2);
        assert_eq!(rubric.criteria()[1].family(), CriterionFamily::Referencing);
    }
}
