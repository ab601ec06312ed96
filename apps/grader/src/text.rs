//! Small text statistics shared by the scorers and the flag detector.

/// Whitespace-delimited word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Character count of the trimmed text.
pub fn trimmed_len(text: &str) -> usize {
    text.trim().chars().count()
}

/// Total non-overlapping occurrences of every needle in `haystack_lower`.
/// Needles are expected to be lower-case already.
pub fn count_occurrences(haystack_lower: &str, needles: &[&str]) -> usize {
    needles
        .iter()
        .map(|needle| haystack_lower.matches(needle).count())
        .sum()
}
