pub mod generic;
pub mod pattern;

pub use generic::*;
pub use pattern::*;

use tracing::debug;

use crate::models::{MatchStrategy, Occurrence, Segment, TermList, TimedWordIndex};

/// Configuration for term matching
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Terms with fewer characters than this are ignored
    pub min_term_chars: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { min_term_chars: 2 }
    }
}

/// Word positions already claimed by an occurrence in the current scan
#[derive(Debug, Clone)]
pub struct ClaimedPositions {
    claimed: Vec<bool>,
}

impl ClaimedPositions {
    pub fn new(len: usize) -> Self {
        Self {
            claimed: vec![false; len],
        }
    }

    /// Whether any position in `start..=end` is claimed or out of range
    pub fn is_blocked(&self, start: usize, end: usize) -> bool {
        end >= self.claimed.len() || self.claimed[start..=end].iter().any(|&c| c)
    }

    pub fn claim(&mut self, start: usize, end: usize) {
        for slot in &mut self.claimed[start..=end] {
            *slot = true;
        }
    }
}

/// Locate every non-overlapping occurrence of a category's terms.
///
/// Dispatches on the category strategy. Whatever the strategy, no two
/// occurrences in the result share a word position. Results are in
/// discovery order; use [`crate::models::sort_by_start`] for display.
pub fn match_terms(
    list: &TermList,
    index: &TimedWordIndex,
    segments: &[Segment],
    config: &MatchConfig,
) -> Vec<Occurrence> {
    let terms = scan_order(&list.terms, config);
    if terms.is_empty() || index.is_empty() {
        return Vec::new();
    }

    let occurrences = match list.category.strategy {
        MatchStrategy::Generic => match_generic(&terms, index, list.category.case_sensitive),
        MatchStrategy::Pattern => {
            match_pattern(&terms, index, segments, list.category.case_sensitive)
        }
    };

    debug!(
        category = %list.category.name,
        terms = terms.len(),
        occurrences = occurrences.len(),
        "matched terms"
    );

    occurrences
}

/// Valid terms, longest first.
///
/// Ordered by token count then character count (both descending), so a
/// phrase claims its words before any shorter term it contains.
fn scan_order<'a>(terms: &'a [String], config: &MatchConfig) -> Vec<&'a str> {
    let mut valid: Vec<&str> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| t.chars().count() >= config.min_term_chars)
        .collect();
    valid.sort_by(|a, b| {
        let key = |t: &str| (t.split_whitespace().count(), t.chars().count());
        key(b).cmp(&key(a))
    });
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryGroup, TermCategory, Word};
    use crate::stages::build_index;

    fn list(category: TermCategory, terms: &[&str]) -> TermList {
        TermList::new(category, terms.iter().map(|t| t.to_string()).collect())
    }

    fn person() -> TermCategory {
        TermCategory::new("Person", CategoryGroup::Entity)
    }

    fn timed_index(words: &[&str]) -> TimedWordIndex {
        let words = words
            .iter()
            .enumerate()
            .map(|(i, w)| Word {
                text: w.to_string(),
                start_seconds: i as f64,
                end_seconds: (i + 1) as f64,
                segment_index: 0,
            })
            .collect();
        TimedWordIndex::from_words(words, 1)
    }

    fn assert_disjoint(occurrences: &[Occurrence]) {
        for (i, a) in occurrences.iter().enumerate() {
            for b in &occurrences[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_round_trip_single_word() {
        let segments = vec![Segment::new("the cat sat", 0.0, 3.0)];
        let index = build_index(&segments);
        let found = match_terms(&list(person(), &["cat"]), &index, &segments, &MatchConfig::default());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].term, "cat");
        assert_eq!(found[0].word_index_start, 1);
        assert_eq!(found[0].word_index_end, 1);
        assert_eq!(found[0].start_seconds, 1.0);
    }

    #[test]
    fn test_phrase_suppresses_contained_term() {
        let index = timed_index(&["new", "york", "city", "is", "big"]);

        for terms in [["new york city", "new york"], ["new york", "new york city"]] {
            let found = match_terms(&list(person(), &terms), &index, &[], &MatchConfig::default());
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].term, "new york city");
            assert_eq!(found[0].start_seconds, 0.0);
            assert_eq!(found[0].word_index_end, 2);
        }
    }

    #[test]
    fn test_case_policy() {
        let index = timed_index(&["nasa", "launched"]);
        let insensitive = TermCategory::new("Acronym", CategoryGroup::Grammar);
        let sensitive = TermCategory::new("Abbreviation", CategoryGroup::Grammar).case_sensitive();

        let config = MatchConfig::default();
        assert_eq!(match_terms(&list(insensitive, &["NASA"]), &index, &[], &config).len(), 1);
        assert!(match_terms(&list(sensitive, &["NASA"]), &index, &[], &config).is_empty());
    }

    #[test]
    fn test_short_and_blank_terms_rejected() {
        let index = timed_index(&["a", "i", "ok"]);
        let found = match_terms(&list(person(), &["a", " i ", "", "ok"]), &index, &[], &MatchConfig::default());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].term, "ok");
    }

    #[test]
    fn test_empty_inputs() {
        let config = MatchConfig::default();
        let empty_index = build_index(&[]);
        assert!(match_terms(&list(person(), &["cat"]), &empty_index, &[], &config).is_empty());

        let index = timed_index(&["cat"]);
        assert!(match_terms(&list(person(), &[]), &index, &[], &config).is_empty());
        assert!(match_terms(&list(person(), &["dog"]), &index, &[], &config).is_empty());
    }

    #[test]
    fn test_repeated_term_not_deduplicated() {
        let segments = vec![
            Segment::new("alice met bob", 0.0, 3.0),
            Segment::new("then alice left", 3.0, 6.0),
        ];
        let index = build_index(&segments);
        let found = match_terms(&list(person(), &["Alice", "Bob"]), &index, &segments, &MatchConfig::default());

        let positions: Vec<usize> = found.iter().map(|o| o.word_index_start).collect();
        assert_eq!(found.len(), 3);
        assert!(positions.contains(&0) && positions.contains(&2) && positions.contains(&4));
        assert_disjoint(&found);
    }

    #[test]
    fn test_overlapping_terms_never_share_positions() {
        let index = timed_index(&["big", "red", "big", "red", "dog", "red", "dog"]);
        let terms = ["red big", "big red", "red dog", "big red dog", "dog"];
        let found = match_terms(&list(person(), &terms), &index, &[], &MatchConfig::default());

        assert_disjoint(&found);
        let covered: usize = found.iter().map(Occurrence::word_count).sum();
        assert_eq!(covered, 7);
    }

    #[test]
    fn test_custom_minimum_length() {
        let index = timed_index(&["go", "team"]);
        let config = MatchConfig { min_term_chars: 3 };
        let found = match_terms(&list(person(), &["go", "team"]), &index, &[], &config);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].term, "team");
    }
}
