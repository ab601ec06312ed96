//! Percentage and grade-band calculation.

use serde::{Deserialize, Serialize};

use crate::rubric::RubricDefinition;
use crate::scoring::MarkBreakdown;

/// Categorical outcome derived from a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradeBand {
    Distinction,
    Merit,
    Pass,
    #[serde(rename = "Fail/Refer")]
    FailRefer,
}

/// Lower bounds (inclusive), highest band first. Together they partition [0, 100].
const GRADE_TABLE: [(f64, GradeBand); 4] = [
    (70.0, GradeBand::Distinction),
    (60.0, GradeBand::Merit),
    (40.0, GradeBand::Pass),
    (0.0, GradeBand::FailRefer),
];

impl GradeBand {
    pub fn label(&self) -> &'static str {
        match self {
            GradeBand::Distinction => "Distinction",
            GradeBand::Merit => "Merit",
            GradeBand::Pass => "Pass",
            GradeBand::FailRefer => "Fail/Refer",
        }
    }
}

/// Maps a percentage to its band; the first band whose lower bound is met wins.
/// Values outside [0, 100] are clamped and NaN counts as 0.
pub fn grade_for(percentage: f64) -> GradeBand {
    let p = if percentage.is_nan() {
        0.0
    } else {
        percentage.clamp(0.0, 100.0)
    };
    GRADE_TABLE
        .iter()
        .find(|(lower, _)| p >= *lower)
        .map(|(_, band)| *band)
        .unwrap_or(GradeBand::FailRefer)
}

/// total / max * 100, rounded to one decimal place.
pub fn percentage_of(total: u32, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    round_one_decimal(total as f64 / max as f64 * 100.0)
}

/// Percentage for a breakdown: weighted by criterion weight when the rubric
/// uses weights, otherwise plain total / max.
pub fn rubric_percentage(marks: &MarkBreakdown, rubric: &RubricDefinition) -> f64 {
    if !rubric.is_weighted() {
        return percentage_of(marks.total(), marks.max_total());
    }
    let weighted: f64 = rubric
        .criteria()
        .iter()
        .filter_map(|spec| {
            let result = marks.get(&spec.name)?;
            Some(spec.weight.unwrap_or(0.0) * result.ratio())
        })
        .sum();
    round_one_decimal((weighted * 100.0).clamp(0.0, 100.0))
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
