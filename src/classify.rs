//! Text facts derived from a result's title and description.
//!
//! Both functions are pure: same input, same output, no state.

use once_cell::sync::Lazy;
use regex::Regex;

/// `$1,234.56`-style amounts, or a bare integer followed by `dollars`/`USD`.
///
/// Only the dollar sign is recognised, and only US digit grouping; European
/// `1.234,56` amounts are intentionally not matched.
static MONEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$\d{1,3}(,\d{3})*(\.\d{2})?|\b\d+\s?(dollars|USD)\b")
        .expect("money pattern is a valid regex")
});

/// Count case-insensitive, non-overlapping occurrences of `phrase` in
/// `title` plus `description`.
///
/// An empty phrase yields `0` rather than one match per character boundary.
pub fn count_phrase_matches(phrase: &str, title: &str, description: &str) -> usize {
    if phrase.is_empty() {
        return 0;
    }
    let needle = phrase.to_lowercase();
    let count_in = |haystack: &str| haystack.to_lowercase().matches(needle.as_str()).count();
    count_in(title) + count_in(description)
}

/// True if either string mentions an amount of money.
pub fn contains_money_amount(title: &str, description: &str) -> bool {
    MONEY_PATTERN.is_match(title) || MONEY_PATTERN.is_match(description)
}
