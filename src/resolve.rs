use serde::{Deserialize, Serialize};

use crate::models::{Segment, TimedWordIndex, effective_end};

/// How playback time is snapped before comparing against segment boundaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSnap {
    /// Round down to the whole second containing the time
    #[default]
    Floor,
    /// Round to the nearest whole second
    Nearest,
    /// Compare the raw time
    Exact,
}

impl TimeSnap {
    pub fn apply(self, time: f64) -> f64 {
        match self {
            TimeSnap::Floor => time.floor(),
            TimeSnap::Nearest => time.round(),
            TimeSnap::Exact => time,
        }
    }
}

/// Configuration for active-position resolution
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Snapping applied to the playback time for segment lookups.
    /// Word lookups always use the raw time.
    pub snap: TimeSnap,
}

/// The segment and word under the playback cursor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePosition {
    pub segment: Option<usize>,
    pub word: Option<usize>,
}

/// Index of the segment active at `time`, using the default snapping
pub fn resolve_active_segment(time: f64, segments: &[Segment]) -> Option<usize> {
    resolve_active_segment_with(time, segments, &ResolverConfig::default())
}

/// Index of the segment active at `time`.
///
/// Segment `i` is active when `start <= t < effective_end(i)`, where `t` is
/// the snapped time. Segments are scanned in order and the first match wins.
pub fn resolve_active_segment_with(time: f64, segments: &[Segment], config: &ResolverConfig) -> Option<usize> {
    if !time.is_finite() {
        return None;
    }
    let t = config.snap.apply(time);

    segments
        .iter()
        .enumerate()
        .find(|(i, segment)| t >= segment.start_seconds && t < effective_end(segments, *i))
        .map(|(i, _)| i)
}

/// Position of the word active at `time`, compared without snapping
pub fn resolve_active_word(time: f64, index: &TimedWordIndex) -> Option<usize> {
    if !time.is_finite() {
        return None;
    }
    index.iter().position(|word| word.contains(time))
}

/// Resolve both the active segment and the active word
pub fn resolve_active(
    time: f64,
    segments: &[Segment],
    index: &TimedWordIndex,
    config: &ResolverConfig,
) -> ActivePosition {
    ActivePosition {
        segment: resolve_active_segment_with(time, segments, config),
        word: resolve_active_word(time, index),
    }
}
