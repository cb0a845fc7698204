use crate::models::{Occurrence, TimedWordIndex};

use super::ClaimedPositions;

/// Token-window matching against the word index.
///
/// Each term is split on whitespace into `k` tokens and a window of `k` words
/// slides over the index. A window matches when every token equals the
/// corresponding word exactly (after lower-casing both unless
/// `case_sensitive`). A match claims its words and the scan resumes after
/// them; windows touching claimed words are skipped.
///
/// `terms` must already be in scan order (longest first).
pub fn match_generic(terms: &[&str], index: &TimedWordIndex, case_sensitive: bool) -> Vec<Occurrence> {
    let fold = |s: &str| {
        if case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };

    // Fold the index once; every term compares against the same words
    let words: Vec<String> = index.iter().map(|w| fold(&w.text)).collect();
    let mut claimed = ClaimedPositions::new(words.len());
    let mut occurrences = Vec::new();

    for term in terms {
        let tokens: Vec<String> = term.split_whitespace().map(fold).collect();
        let k = tokens.len();
        if k == 0 || k > words.len() {
            continue;
        }

        // Slide a k-word window, skipping past each match
        let mut i = 0;
        while i + k <= words.len() {
            let end = i + k - 1;
            if words[i..=end] == tokens[..] && !claimed.is_blocked(i, end) {
                claimed.claim(i, end);
                occurrences.push(Occurrence {
                    term: term.to_string(),
                    word_index_start: i,
                    word_index_end: end,
                    start_seconds: index.words()[i].start_seconds,
                });
                i += k;
            } else {
                i += 1;
            }
        }
    }

    occurrences
}
