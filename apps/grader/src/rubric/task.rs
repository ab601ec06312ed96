/// Returns the "SUMMATIVE TASK" section of a free-form rubric document.
///
/// The section runs from the heading line (matched case-insensitively) up
/// to the next all-caps heading line. Without such a heading the whole
/// trimmed text is returned.
pub fn extract_summative_task(rubric_text: &str) -> &str {
    let lines: Vec<(usize, &str)> = line_offsets(rubric_text);

    let Some(start_idx) = lines
        .iter()
        .position(|(_, line)| line.to_uppercase().contains("SUMMATIVE TASK"))
    else {
        return rubric_text.trim();
    };

    let start = lines[start_idx].0;
    let end = lines[start_idx + 1..]
        .iter()
        .find(|(_, line)| is_heading(line))
        .map(|(offset, _)| *offset)
        .unwrap_or(rubric_text.len());

    rubric_text[start..end].trim()
}

fn line_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .map(|line| {
            let start = offset;
            offset += line.len();
            (start, line.trim_end_matches(['\r', '\n']))
        })
        .collect()
}

fn is_heading(line: &str) -> bool {
    let line = line.trim();
    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 4 && letters.iter().all(|c| c.is_uppercase())
}
