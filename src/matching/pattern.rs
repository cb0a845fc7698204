use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::models::{Occurrence, Segment, TimedWordIndex};

use super::ClaimedPositions;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Locate pattern-category terms in raw segment text.
///
/// Each term is searched literally in every segment's text. A hit is mapped
/// to a word position by counting whitespace runs before the hit within the
/// segment and adding that to the segment's first word position. The mapping
/// is approximate: multi-token hits anchor on their first word, and leading
/// or doubled whitespace can shift the anchor by one. Positions are clamped
/// to the segment's own words.
///
/// `terms` must already be in scan order (longest first).
pub fn match_pattern(
    terms: &[&str],
    index: &TimedWordIndex,
    segments: &[Segment],
    case_sensitive: bool,
) -> Vec<Occurrence> {
    let mut claimed = ClaimedPositions::new(index.len());
    let mut occurrences = Vec::new();

    for term in terms {
        // Literal search, case-folded unless the category is case-sensitive
        let pattern = if case_sensitive {
            regex::escape(term)
        } else {
            format!("(?i){}", regex::escape(term))
        };
        let regex = match Regex::new(&pattern) {
            Ok(regex) => regex,
            Err(err) => {
                warn!(term, error = %err, "skipping term that cannot be searched");
                continue;
            }
        };
        let span = term.split_whitespace().count().max(1);

        for (segment_index, segment) in segments.iter().enumerate() {
            let words = index.segment_words(segment_index);
            if words.is_empty() {
                continue;
            }
            let last = words.end - 1;

            // Anchor each hit on a word of this segment
            for hit in regex.find_iter(&segment.text) {
                let offset = token_offset(&segment.text[..hit.start()]);
                let start = (words.start + offset).min(last);
                let end = (start + span - 1).min(last);
                // Longer terms were scanned first and keep their words
                if claimed.is_blocked(start, end) {
                    continue;
                }
                claimed.claim(start, end);
                occurrences.push(Occurrence {
                    term: term.to_string(),
                    word_index_start: start,
                    word_index_end: end,
                    start_seconds: index.words()[start].start_seconds,
                });
            }
        }
    }

    occurrences
}

/// Number of tokens before a character offset, counted as whitespace runs
fn token_offset(prefix: &str) -> usize {
    WHITESPACE_RUN.find_iter(prefix).count()
}
