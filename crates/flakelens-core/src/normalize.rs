use crate::model::RunAttempt;
use std::collections::BTreeSet;

/// Union of the normalized console lines of `attempts`.
///
/// Each text chunk of stdout then stderr is split on line breaks; lines are
/// trimmed, empty ones dropped, the rest lower-cased. Buffer chunks carry no
/// lines.
pub fn extract_log_lines<'a, I>(attempts: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a RunAttempt>,
{
    let mut lines = BTreeSet::new();
    for attempt in attempts {
        for text in attempt.console_chunks().filter_map(|c| c.as_text()) {
            for line in text.lines() {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    lines.insert(trimmed.to_lowercase());
                }
            }
        }
    }
    lines
}
