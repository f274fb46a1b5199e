//! Turns a conversational utterance into a search query.
//!
//! Leading filler ("can you find me documents about ...") is stripped as a
//! single greedy, anchored, case-insensitive match over a fixed word list.
//! Trailing punctuation and a dangling "mean"/"is" are then removed.

use std::sync::LazyLock;

use regex::Regex;

/// Words and stems that carry no query-discriminating meaning at the start of
/// an utterance. Entries are regex fragments.
const FILLER_WORDS: &[&str] = &[
    "a", "an", "am", "with", "hope", r"try[a-z]*", r"interest[a-z]+", r"mean[a-z]+", "help",
    r"assist[a-z]*", r"find[a-z]*", r"look[a-z]*", r"seek[a-z]*", "the", "who", "what", "why",
    "when", "did", "how", "where", r"kill[a-z]*", r"assassin[a-z]*", "is", "um", "uh", "ah",
    "and", "now", "has", "have", "had", "are", "were", "was", "out", "does", "please", "can",
    "will", "you", "show", "tell", "search", "for", "me", "i", "us", "would", "like", "want",
    "to", "see", "in", "know", r"documents?", r"files?", r"pictures?", r"photos?", r"images?",
    "of", "on", "more", "results", "about",
];

const TRAILING_PUNCTUATION: &[char] = &['.', '?', '!', ',', ';', ':'];

static FILLER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = FILLER_WORDS.join("|");
    Regex::new(&format!(r"(?i)^(?:(?:{})(?:\s+|$))+", alternation))
        .expect("filler prefix pattern is valid")
});

/// Stateless query normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryNormalizer;

impl QueryNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize an utterance into a query. May return an empty string.
    pub fn normalize(&self, text: &str) -> String {
        let text = text.trim().trim_end_matches(TRAILING_PUNCTUATION);

        let prefix_len = FILLER_PREFIX.find(text).map_or(0, |m| m.end());
        let query = text[prefix_len..].trim_end_matches(TRAILING_PUNCTUATION);

        let query = strip_suffix_ci(query, " means")
            .or_else(|| strip_suffix_ci(query, " mean"))
            .or_else(|| strip_suffix_ci(query, " is"))
            .unwrap_or(query);

        query.trim().to_string()
    }
}

/// ASCII case-insensitive `str::strip_suffix`.
fn strip_suffix_ci<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let split = text.len().checked_sub(suffix.len())?;
    if !text.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = text.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}
