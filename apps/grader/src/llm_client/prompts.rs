// Prompt fragments shared by every caller of the LLM client.
// Task-specific prompts live next to their scorer.

/// Appended to system prompts that expect a single JSON object back.
pub const JSON_ONLY_SYSTEM: &str = "Reply with one JSON object and nothing else. \
    No prose before or after it, no markdown fences, no comments inside it.";

/// Keeps numeric scores inside the rubric.
pub const SCORE_BOUNDS_INSTRUCTION: &str = "\
    Every score must be a whole number from 0 to the max_score listed for that \
    criterion. Score every listed criterion using its exact name as the JSON key \
    and add no others.";
