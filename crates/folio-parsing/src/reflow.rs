use once_cell::sync::Lazy;
use regex::Regex;

use crate::noise::NoiseFilter;

/// Collapse line breaks inside paragraphs while keeping paragraph breaks.
///
/// Paragraphs are separated by one or more blank lines. Inside a paragraph,
/// newlines become spaces and runs of spaces collapse to one. Paragraphs are
/// trimmed, empty ones dropped, and the rest joined with a blank line.
/// Idempotent: the output contains no single newlines to collapse.
pub fn reflow(text: &str) -> String {
    static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n+").unwrap());
    static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());

    if text.is_empty() {
        return String::new();
    }

    PARAGRAPH_BREAK
        .split(text)
        .filter_map(|para| {
            let joined = para.replace('\n', " ");
            let collapsed = SPACES.replace_all(&joined, " ");
            let trimmed = collapsed.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Drop noise lines, then reflow what remains.
pub fn clean(text: &str, filter: &NoiseFilter) -> String {
    if text.is_empty() {
        return String::new();
    }
    reflow(&filter.filter(text))
}
