pub mod error;
pub mod io;
pub mod matching;
pub mod models;
pub mod patterns;
pub mod providers;
pub mod resolve;
pub mod session;
pub mod stages;
pub mod stats;

pub use error::{ConcordanceError, Result};
pub use io::{
    OccurrenceReport, SnippetConfig, TranscriptRenderer, format_clock, load_segments,
    parse_segments_file, parse_segments_json, parse_terms_file, write_json,
};
pub use matching::{MatchConfig, match_terms};
pub use models::{
    CategoryCatalog, CategoryGroup, MatchStrategy, Occurrence, RawSegment, SeekRequest, Segment,
    TermCategory, TermList, TimedWordIndex, Word,
};
pub use patterns::{PatternKind, extract_pattern_terms};
pub use providers::{PatternTermProvider, StaticTermProvider, TermProvider};
pub use resolve::{ActivePosition, ResolverConfig, TimeSnap, resolve_active};
pub use session::{
    IndexSnapshot, IndexVersion, MatchOutcome, PlaybackCursor, SelectionState, SessionConfig,
    TranscriptSession, run_match,
};
pub use stages::{NormalizeConfig, build_index, interpolate_words, normalize};
pub use stats::TranscriptStats;
