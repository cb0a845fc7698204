use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConcordanceError, Result};
use crate::matching::{MatchConfig, match_terms};
use crate::models::{
    CategoryCatalog, Occurrence, RawSegment, Segment, TermCategory, TermList, TimedWordIndex,
    sort_by_start,
};
use crate::providers::{TermProvider, prepare_terms};
use crate::resolve::{ActivePosition, ResolverConfig, resolve_active};
use crate::stages::{NormalizeConfig, build_index, normalize};

/// Identifies one build of the word index. Bumped on every rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexVersion(u64);

impl IndexVersion {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Immutable view of one index build, cheap to clone and send across threads
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    pub version: IndexVersion,
    pub segments: Arc<[Segment]>,
    pub index: Arc<TimedWordIndex>,
}

impl IndexSnapshot {
    /// All segment text joined with single spaces
    pub fn transcript_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of matching one category against one snapshot
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub version: IndexVersion,
    pub category: TermCategory,
    /// Sorted by start time
    pub occurrences: Vec<Occurrence>,
}

/// Match `list` against `snapshot`. Pure; may run on any thread.
pub fn run_match(snapshot: &IndexSnapshot, list: &TermList, config: &MatchConfig) -> MatchOutcome {
    let mut occurrences = match_terms(list, &snapshot.index, &snapshot.segments, config);
    sort_by_start(&mut occurrences);
    MatchOutcome {
        version: snapshot.version,
        category: list.category.clone(),
        occurrences,
    }
}

/// Category selection state
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SelectionState {
    /// No category selected, nothing materialized
    #[default]
    Idle,
    /// Occurrences held for the selected category
    Selected {
        category: TermCategory,
        occurrences: Vec<Occurrence>,
    },
}

/// Configuration for a [`TranscriptSession`]
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub normalize: NormalizeConfig,
    pub matching: MatchConfig,
    pub resolver: ResolverConfig,
}

/// Host-side state container around the pure engine functions.
///
/// Owns the current index snapshot and the category selection. Loading new
/// segments rebuilds the index, bumps the version and returns to `Idle`.
pub struct TranscriptSession {
    snapshot: IndexSnapshot,
    state: SelectionState,
    catalog: CategoryCatalog,
    provider: Box<dyn TermProvider>,
    config: SessionConfig,
}

impl TranscriptSession {
    pub fn new(catalog: CategoryCatalog, provider: Box<dyn TermProvider>, config: SessionConfig) -> Self {
        Self {
            snapshot: IndexSnapshot::default(),
            state: SelectionState::Idle,
            catalog,
            provider,
            config,
        }
    }

    /// Normalize backend records and load them
    pub fn load_raw(&mut self, raw_segments: &[RawSegment]) -> IndexVersion {
        let segments = normalize(raw_segments, &self.config.normalize).segments;
        self.load_segments(segments)
    }

    /// Replace the transcript, rebuilding the index from scratch
    pub fn load_segments(&mut self, segments: Vec<Segment>) -> IndexVersion {
        let index = build_index(&segments);
        let version = self.snapshot.version.next();
        info!(
            version = version.get(),
            segments = segments.len(),
            words = index.len(),
            "loaded transcript"
        );

        self.snapshot = IndexSnapshot {
            version,
            segments: segments.into(),
            index: Arc::new(index),
        };
        self.state = SelectionState::Idle;
        version
    }

    pub fn snapshot(&self) -> IndexSnapshot {
        self.snapshot.clone()
    }

    pub fn version(&self) -> IndexVersion {
        self.snapshot.version
    }

    pub fn segments(&self) -> &[Segment] {
        &self.snapshot.segments
    }

    pub fn index(&self) -> &TimedWordIndex {
        &self.snapshot.index
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected_category(&self) -> Option<&TermCategory> {
        match &self.state {
            SelectionState::Idle => None,
            SelectionState::Selected { category, .. } => Some(category),
        }
    }

    /// Occurrences for the selected category, empty when idle
    pub fn occurrences(&self) -> &[Occurrence] {
        match &self.state {
            SelectionState::Idle => &[],
            SelectionState::Selected { occurrences, .. } => occurrences.as_slice(),
        }
    }

    /// Prepared term list for `category` from the provider
    pub fn term_list(&self, category: &TermCategory) -> TermList {
        let raw = self
            .provider
            .terms(category, &self.snapshot.transcript_text());
        TermList::new(
            category.clone(),
            prepare_terms(&raw, self.config.matching.min_term_chars),
        )
    }

    /// Select a catalog category by name.
    ///
    /// Selecting the category that is already selected deselects it.
    /// Selecting another category replaces the held occurrences.
    pub fn select_category(&mut self, name: &str) -> Result<&SelectionState> {
        if self.selected_category().is_some_and(|c| c.name == name) {
            debug!(category = name, "deselecting category");
            self.state = SelectionState::Idle;
            return Ok(&self.state);
        }

        let category = self
            .catalog
            .get(name)
            .cloned()
            .ok_or_else(|| ConcordanceError::unknown_category(name))?;
        let list = self.term_list(&category);
        let outcome = run_match(&self.snapshot, &list, &self.config.matching);
        self.accept(outcome);
        Ok(&self.state)
    }

    /// Run a free-text search; a blank query returns to `Idle`
    pub fn select_search(&mut self, query: &str) -> &SelectionState {
        let query = query.trim();
        if query.is_empty() {
            self.state = SelectionState::Idle;
            return &self.state;
        }
        let list = TermList::new(TermCategory::search(), vec![query.to_string()]);
        let outcome = run_match(&self.snapshot, &list, &self.config.matching);
        self.accept(outcome);
        &self.state
    }

    pub fn clear(&mut self) {
        self.state = SelectionState::Idle;
    }

    /// Install a match result unless it was computed against an older index.
    ///
    /// Returns whether the outcome was accepted.
    pub fn accept(&mut self, outcome: MatchOutcome) -> bool {
        if outcome.version != self.snapshot.version {
            debug!(
                stale = outcome.version.get(),
                current = self.snapshot.version.get(),
                "discarding stale match result"
            );
            return false;
        }
        self.state = SelectionState::Selected {
            category: outcome.category,
            occurrences: outcome.occurrences,
        };
        true
    }

    /// Number of distinct usable terms per catalog category
    pub fn term_counts(&self) -> Vec<(String, usize)> {
        self.catalog
            .categories()
            .iter()
            .map(|category| (category.name.clone(), self.term_list(category).terms.len()))
            .collect()
    }

    /// Active segment and word at playback `time`
    pub fn resolve(&self, time: f64) -> ActivePosition {
        resolve_active(
            time,
            &self.snapshot.segments,
            &self.snapshot.index,
            &self.config.resolver,
        )
    }
}

/// The caller's last known active position.
///
/// Resolution runs on every clock tick; this reports only changes so the host
/// can skip redundant notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackCursor {
    current: ActivePosition,
}

impl PlaybackCursor {
    /// Record `position`, returning it if it differs from the previous one
    pub fn update(&mut self, position: ActivePosition) -> Option<ActivePosition> {
        if position == self.current {
            return None;
        }
        self.current = position;
        Some(position)
    }

    pub fn current(&self) -> ActivePosition {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = ActivePosition::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::StaticTermProvider;

    fn session() -> TranscriptSession {
        let provider = StaticTermProvider::default()
            .with("Person", &["Alice", "Bob", "x"])
            .with("Place", &["new york city", "new york"]);
        let mut session = TranscriptSession::new(
            CategoryCatalog::builtin(),
            Box::new(provider),
            SessionConfig::default(),
        );
        session.load_segments(vec![
            Segment::new("Alice flew to new york city", 0.0, 6.0),
            Segment::new("Bob ran 5 km to meet Alice", 6.0, 13.0),
        ]);
        session
    }

    #[test]
    fn test_select_and_toggle() {
        let mut session = session();
        assert_eq!(session.state(), &SelectionState::Idle);

        session.select_category("Person").unwrap();
        assert_eq!(session.selected_category().unwrap().name, "Person");
        let times: Vec<f64> = session.occurrences().iter().map(|o| o.start_seconds).collect();
        assert_eq!(times, vec![0.0, 6.0, 12.0]);

        session.select_category("Person").unwrap();
        assert_eq!(session.state(), &SelectionState::Idle);
        assert!(session.occurrences().is_empty());
    }

    #[test]
    fn test_switch_category_replaces_occurrences() {
        let mut session = session();
        session.select_category("Person").unwrap();
        session.select_category("Place").unwrap();

        assert_eq!(session.selected_category().unwrap().name, "Place");
        assert_eq!(session.occurrences().len(), 1);
        assert_eq!(session.occurrences()[0].term, "new york city");
    }

    #[test]
    fn test_unit_category_uses_patterns() {
        let mut session = session();
        session.select_category("Unit").unwrap();

        let occurrences = session.occurrences();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].term, "5 km");
        assert_eq!(occurrences[0].word_index_start, 8);
    }

    #[test]
    fn test_unknown_category() {
        let mut session = session();
        let err = session.select_category("Nope").unwrap_err();
        assert!(matches!(err, ConcordanceError::UnknownCategory { .. }));
        assert_eq!(session.state(), &SelectionState::Idle);
    }

    #[test]
    fn test_reload_resets_to_idle() {
        let mut session = session();
        session.select_category("Person").unwrap();
        let before = session.version();

        let after = session.load_segments(vec![Segment::new("nobody here", 0.0, 2.0)]);
        assert!(after > before);
        assert_eq!(session.state(), &SelectionState::Idle);
        assert_eq!(session.index().len(), 2);
    }

    #[test]
    fn test_stale_result_discarded() {
        let mut session = session();
        let snapshot = session.snapshot();
        let list = session.term_list(session.catalog().get("Person").unwrap());

        session.load_segments(vec![Segment::new("Alice again", 0.0, 2.0)]);
        let late = run_match(&snapshot, &list, &MatchConfig::default());
        assert_eq!(late.occurrences.len(), 3);

        assert!(!session.accept(late));
        assert_eq!(session.state(), &SelectionState::Idle);

        let fresh = run_match(&session.snapshot(), &list, &MatchConfig::default());
        assert!(session.accept(fresh));
        assert_eq!(session.occurrences().len(), 1);
    }

    #[test]
    fn test_snapshot_can_match_on_another_thread() {
        let session = session();
        let snapshot = session.snapshot();
        let list = session.term_list(session.catalog().get("Person").unwrap());

        let outcome = std::thread::spawn(move || run_match(&snapshot, &list, &MatchConfig::default()))
            .join()
            .unwrap();
        assert_eq!(outcome.version, session.version());
    }

    #[test]
    fn test_search() {
        let mut session = session();
        session.select_search("  meet alice ");
        assert_eq!(session.occurrences().len(), 1);
        assert_eq!(session.occurrences()[0].start_seconds, 11.0);

        session.select_search("   ");
        assert_eq!(session.state(), &SelectionState::Idle);
    }

    #[test]
    fn test_term_counts() {
        let session = session();
        let counts: std::collections::HashMap<String, usize> = session.term_counts().into_iter().collect();

        assert_eq!(counts["Person"], 2);
        assert_eq!(counts["Place"], 2);
        assert_eq!(counts["Unit"], 1);
        assert_eq!(counts["Verb"], 0);
    }

    #[test]
    fn test_playback_cursor_reports_changes_only() {
        let session = session();
        let mut cursor = PlaybackCursor::default();

        let first = cursor.update(session.resolve(0.2));
        assert_eq!(first.unwrap().segment, Some(0));
        assert!(cursor.update(session.resolve(0.4)).is_none());

        let moved = cursor.update(session.resolve(1.1)).unwrap();
        assert_eq!(moved.word, Some(1));
        assert_eq!(cursor.current().segment, Some(0));

        cursor.reset();
        assert_eq!(cursor.current(), ActivePosition::default());
    }
}
