//! Per-criterion results and the ordered `MarkBreakdown` every scorer returns.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::rubric::{CriterionSpec, RubricDefinition};

/// Score and justification for one criterion. `score <= max_score` holds for
/// every value that exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCriterionResult")]
pub struct CriterionResult {
    score: u32,
    max_score: u32,
    justification: String,
}

#[derive(Deserialize)]
struct RawCriterionResult {
    score: u32,
    max_score: u32,
    justification: String,
}

impl TryFrom<RawCriterionResult> for CriterionResult {
    type Error = String;

    fn try_from(raw: RawCriterionResult) -> Result<Self, Self::Error> {
        if raw.score > raw.max_score {
            return Err(format!(
                "score {} exceeds max_score {}",
                raw.score, raw.max_score
            ));
        }
        Ok(CriterionResult {
            score: raw.score,
            max_score: raw.max_score,
            justification: raw.justification,
        })
    }
}

impl CriterionResult {
    /// Builds a result, capping `score` at `max_score`.
    pub fn new(score: u32, max_score: u32, justification: impl Into<String>) -> Self {
        Self {
            score: score.min(max_score),
            max_score,
            justification: justification.into(),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn justification(&self) -> &str {
        &self.justification
    }

    /// score / max_score in [0, 1].
    pub fn ratio(&self) -> f64 {
        if self.max_score == 0 {
            return 0.0;
        }
        self.score as f64 / self.max_score as f64
    }
}

/// Criterion name → result, in rubric order. Keys are exactly the rubric's
/// criteria; serialises as a JSON object preserving that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkBreakdown {
    entries: Vec<(String, CriterionResult)>,
}

impl MarkBreakdown {
    /// Builds a breakdown with one entry per rubric criterion, in order.
    pub fn from_rubric<F>(rubric: &RubricDefinition, mut score: F) -> Self
    where
        F: FnMut(&CriterionSpec) -> CriterionResult,
    {
        let entries = rubric
            .criteria()
            .iter()
            .map(|spec| (spec.name.clone(), score(spec)))
            .collect();
        Self { entries }
    }

    /// Like `from_rubric`, but stops at the first criterion the closure fails on.
    pub fn try_from_rubric<F, E>(rubric: &RubricDefinition, mut score: F) -> Result<Self, E>
    where
        F: FnMut(&CriterionSpec) -> Result<CriterionResult, E>,
    {
        let entries = rubric
            .criteria()
            .iter()
            .map(|spec| score(spec).map(|result| (spec.name.clone(), result)))
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Self { entries })
    }

    pub fn get(&self, criterion: &str) -> Option<&CriterionResult> {
        self.entries
            .iter()
            .find(|(name, _)| name == criterion)
            .map(|(_, result)| result)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CriterionResult)> {
        self.entries.iter().map(|(name, result)| (name.as_str(), result))
    }

    pub fn total(&self) -> u32 {
        self.entries.iter().map(|(_, r)| r.score).sum()
    }

    pub fn max_total(&self) -> u32 {
        self.entries.iter().map(|(_, r)| r.max_score).sum()
    }

    /// True when the keys are exactly the rubric's criteria, in order.
    pub fn matches_rubric(&self, rubric: &RubricDefinition) -> bool {
        self.entries.len() == rubric.criteria().len()
            && self
                .entries
                .iter()
                .zip(rubric.criteria())
                .all(|((name, result), spec)| {
                    *name == spec.name && result.max_score == spec.max_score
                })
    }
}

impl Serialize for MarkBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MarkBreakdown {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BreakdownVisitor;

        impl<'de> Visitor<'de> for BreakdownVisitor {
            type Value = MarkBreakdown;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of criterion name to criterion result")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, CriterionResult)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, result)) = access.next_entry::<String, CriterionResult>()? {
                    if entries.iter().any(|(existing, _)| *existing == name) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate criterion '{name}'"
                        )));
                    }
                    entries.push((name, result));
                }
                Ok(MarkBreakdown { entries })
            }
        }

        deserializer.deserialize_map(BreakdownVisitor)
    }
}
