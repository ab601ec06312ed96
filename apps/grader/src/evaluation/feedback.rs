//! Deterministic narrative used whenever the remote scorer did not supply one.

use crate::evaluation::flags::Flags;
use crate::evaluation::grade::GradeBand;
use crate::scoring::{MarkBreakdown, Narrative};

/// Builds overall feedback, strengths and improvements from the marks, grade
/// and flags. Same inputs, same text.
pub fn synthesize_narrative(
    marks: &MarkBreakdown,
    percentage: f64,
    grade: GradeBand,
    flags: &Flags,
) -> Narrative {
    let summary = match grade {
        GradeBand::Distinction => {
            "An excellent submission that demonstrates consistently strong achievement across the rubric."
        }
        GradeBand::Merit => {
            "A good submission that meets most expectations, with some areas for further development."
        }
        GradeBand::Pass => {
            "A satisfactory submission that meets the minimum standard but needs further development in several areas."
        }
        GradeBand::FailRefer => {
            "The submission does not yet meet the required standard and should be revised and resubmitted."
        }
    };

    let mut overall_feedback = format!(
        "{summary} Overall score: {}/{} ({percentage:.1}%, {}).",
        marks.total(),
        marks.max_total(),
        grade.label()
    );
    if flags.any() {
        overall_feedback.push_str(" This submission has been flagged for academic review.");
    }

    let mut strengths = Vec::new();
    let mut improvements = Vec::new();
    for (name, result) in marks.iter() {
        // Integer comparison: ratio >= 0.6 counts as a strength.
        if result.score() as u64 * 10 >= result.max_score() as u64 * 6 {
            strengths.push(format!("{name}: {}", result.justification()));
        } else {
            improvements.push(format!(
                "{name}: develop this area further (scored {}/{}).",
                result.score(),
                result.max_score()
            ));
        }
    }

    if flags.empty_or_invalid {
        improvements.push(
            "Submit a complete response; the current text is too short to assess fully."
                .to_string(),
        );
    }
    if flags.off_topic {
        improvements.push(
            "Focus the response on the task brief using academic analysis and evidence."
                .to_string(),
        );
    }
    if flags.below_standard {
        improvements.push(
            "Adopt a formal academic register and avoid conversational phrasing.".to_string(),
        );
    }
    if flags.possible_misconduct {
        improvements.push(
            "Paraphrase sources in your own words and reference them; avoid copied definitions."
                .to_string(),
        );
    }

    Narrative {
        overall_feedback,
        strengths,
        improvements,
        achievement_notes: Vec::new(),
    }
}
