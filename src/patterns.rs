use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Family of a lexical pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Weights, lengths, volumes, temperatures, percentages
    Measurement,
    /// Time spans ("3 hours", "10 min")
    Duration,
    /// Frequencies, storage sizes, electrical units
    Technical,
    /// Amounts with a leading currency symbol
    Currency,
}

/// The fixed battery, applied in order
static PATTERNS: Lazy<Vec<(PatternKind, Regex)>> = Lazy::new(|| {
    [
        (
            PatternKind::Measurement,
            r"(?i)(\d+(?:\.\d+)?)\s*(kg|mg|g|lb|oz|km|cm|mm|miles|mi|m|ft|feet|inches|inch|in|gallons|gal|ml|l|percent)\b",
        ),
        (PatternKind::Measurement, r"(?i)(\d+(?:\.\d+)?)\s*(°C|°F|%)"),
        (
            PatternKind::Duration,
            r"(?i)(\d+(?:\.\d+)?)\s*(hours|hour|hrs|hr|minutes|minute|mins|min|seconds|second|secs|sec|days|day|weeks|week|months|month|years|year)\b",
        ),
        (
            PatternKind::Technical,
            r"(?i)(\d+(?:\.\d+)?)\s*(khz|mhz|hz|mb|gb|tb|kb|watts|joules|volts|amps)\b",
        ),
        (PatternKind::Currency, r"([$€£¥])(\d+(?:\.\d+)?)"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("unit pattern is valid")))
    .collect()
});

/// One pattern hit in a piece of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpan {
    pub kind: PatternKind,
    /// Byte offset of the match start
    pub start: usize,
    /// Byte offset one past the match end
    pub end: usize,
    pub text: String,
}

/// Every pattern hit in `text`, grouped by pattern in battery order
pub fn find_pattern_spans(text: &str) -> Vec<PatternSpan> {
    PATTERNS
        .iter()
        .flat_map(|(kind, regex)| {
            regex.find_iter(text).map(move |m| PatternSpan {
                kind: *kind,
                start: m.start(),
                end: m.end(),
                text: m.as_str().trim().to_string(),
            })
        })
        .filter(|span| !span.text.is_empty())
        .collect()
}

/// Distinct pattern terms in `text`, in first-seen order.
///
/// This is the term list for pattern-matched categories such as "Unit".
pub fn extract_pattern_terms(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for span in find_pattern_spans(text) {
        if !terms.contains(&span.text) {
            terms.push(span.text);
        }
    }
    terms
}
