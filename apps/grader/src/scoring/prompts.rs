// All LLM prompt constants for the scoring module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for rubric scoring.
pub const SCORING_SYSTEM: &str = "You are an experienced academic assessor marking \
    Level 4 coursework against a fixed rubric. Judge only what the submission \
    contains and answer in the JSON schema you are given.";

/// Scoring prompt template.
/// Replace: {json_only}, {score_bounds}, {unit}, {rubric_json}, {task_brief},
///          {criteria_json}, {submission}
pub const SCORING_PROMPT_TEMPLATE: &str = r#"{json_only}

{score_bounds}

UNIT: {unit}

RUBRIC (criterion name and max_score):
{rubric_json}

TASK BRIEF:
{task_brief}

ASSESSMENT CRITERIA (one entry each, criterion_text copied exactly):
{criteria_json}

Return a JSON object with this EXACT schema (no extra fields):
{
  "scores": {
    "<criterion name>": {"score": 0, "justification": "One or two sentences citing the submission."}
  },
  "criteria_achievements": [
    {
      "criterion_text": "2.1 Explain ...",
      "achieved": true,
      "evidence": "Where and how the submission addresses the statement.",
      "improvement_suggestion": "What would strengthen it."
    }
  ],
  "overall_feedback": "A short paragraph addressed to the learner.",
  "strengths": ["..."],
  "improvements": ["..."]
}

SUBMISSION:
{submission}"#;
