use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Segment, effective_end};

/// Label used for segments without a speaker
pub const UNKNOWN_SPEAKER: &str = "Unknown";

/// Summary figures for a transcript
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranscriptStats {
    pub segment_count: usize,
    /// Characters in the space-joined transcript text
    pub char_count: usize,
    pub word_count: usize,
    /// Runs of text terminated by `.`, `!` or `?`
    pub sentence_count: usize,
    /// From the first segment start to the last finite segment end
    pub duration_seconds: f64,
    /// Segments per speaker
    pub speaker_segments: BTreeMap<String, usize>,
}

impl TranscriptStats {
    pub fn from_segments(segments: &[Segment]) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let mut speaker_segments = BTreeMap::new();
        for segment in segments {
            let speaker = segment.speaker.as_deref().unwrap_or(UNKNOWN_SPEAKER);
            *speaker_segments.entry(speaker.to_string()).or_insert(0) += 1;
        }

        Self {
            segment_count: segments.len(),
            char_count: text.chars().count(),
            word_count: text.split_whitespace().count(),
            sentence_count: text
                .split(['.', '!', '?'])
                .filter(|s| !s.trim().is_empty())
                .count(),
            duration_seconds: duration(segments),
            speaker_segments,
        }
    }
}

fn duration(segments: &[Segment]) -> f64 {
    let Some(first) = segments.first() else {
        return 0.0;
    };
    let last = segments.len() - 1;
    let end = match effective_end(segments, last) {
        end if end.is_finite() => end,
        _ => segments[last].start_seconds,
    };
    (end - first.start_seconds).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats() {
        let segments = vec![
            Segment::new("Hello there. How are you?", 2.0, 6.0).with_speaker("A"),
            Segment::new("Fine!", 6.0, 7.0).with_speaker("B"),
            Segment::new("Good", 7.0, 9.5),
        ];
        let stats = TranscriptStats::from_segments(&segments);

        assert_eq!(stats.segment_count, 3);
        assert_eq!(stats.word_count, 7);
        assert_eq!(stats.sentence_count, 4);
        assert_eq!(stats.char_count, 36);
        assert!((stats.duration_seconds - 7.5).abs() < 1e-9);
        assert_eq!(stats.speaker_segments["A"], 1);
        assert_eq!(stats.speaker_segments[UNKNOWN_SPEAKER], 1);
    }

    #[test]
    fn test_open_ended_last_segment() {
        let segments = vec![Segment::new("a", 1.0, 3.0), Segment::open_ended("b", 10.0)];
        let stats = TranscriptStats::from_segments(&segments);
        assert_eq!(stats.duration_seconds, 9.0);
    }

    #[test]
    fn test_empty() {
        assert_eq!(TranscriptStats::from_segments(&[]), TranscriptStats::default());
    }
}
