use tracing::debug;

use crate::models::{RawSegment, Segment, TimedWordIndex, effective_end};

use super::{NormalizeConfig, interpolate_words, normalize};

/// Perform Stage 2: build the flat word index.
///
/// Concatenates each segment's words in segment order, tagging each with its
/// segment index. Segments are taken in the order given and never re-sorted.
pub fn build_index(segments: &[Segment]) -> TimedWordIndex {
    let capacity = segments.iter().map(Segment::token_count).sum();
    let mut words = Vec::with_capacity(capacity);

    for (segment_index, segment) in segments.iter().enumerate() {
        let end = effective_end(segments, segment_index);
        words.extend(interpolate_words(segment, segment_index, end));
    }

    debug!(
        segments = segments.len(),
        words = words.len(),
        "built timed word index"
    );

    TimedWordIndex::from_words(words, segments.len())
}

/// Normalize raw backend segments and build their index in one pass
pub fn build_from_raw(raw_segments: &[RawSegment], config: &NormalizeConfig) -> (Vec<Segment>, TimedWordIndex) {
    let segments = normalize(raw_segments, config).segments;
    let index = build_index(&segments);
    (segments, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_segments_json;

    #[test]
    fn test_build_tags_segments() {
        let segments = vec![
            Segment::new("hello there", 0.0, 2.0),
            Segment::new("", 2.0, 3.0),
            Segment::new("general kenobi", 3.0, 5.0),
        ];
        let index = build_index(&segments);

        let tags: Vec<usize> = index.iter().map(|w| w.segment_index).collect();
        assert_eq!(tags, vec![0, 0, 2, 2]);
        assert_eq!(index.segment_first_word(2), Some(2));
        assert_eq!(index.segment_count(), 3);
    }

    #[test]
    fn test_index_is_monotonic() {
        let segments = vec![
            Segment::new("a b c", 0.0, 3.0),
            Segment::open_ended("d e", 3.0),
            Segment::new("f g h i", 7.0, 7.0),
            Segment::open_ended("j k", 9.5),
        ];
        let index = build_index(&segments);

        assert_eq!(index.len(), 11);
        for pair in index.words().windows(2) {
            assert!(pair[0].start_seconds <= pair[1].start_seconds);
        }
        // open end inferred from the next segment's start
        assert_eq!(index.get(3).unwrap().start_seconds, 3.0);
        assert_eq!(index.get(4).unwrap().start_seconds, 5.0);
        assert!(index.iter().all(|w| w.start_seconds.is_finite() && w.end_seconds.is_finite()));
    }

    #[test]
    fn test_empty_segments() {
        let index = build_index(&[]);
        assert!(index.is_empty());
        assert_eq!(index.duration_seconds(), 0.0);
    }

    #[test]
    fn test_build_from_raw() {
        let raw = parse_segments_json(
            r#"[{"text": "the cat sat", "start": 0, "end": 3},
                {"text": "on the mat", "start_seconds": 3, "end_seconds": 6}]"#,
        )
        .unwrap();
        let (segments, index) = build_from_raw(&raw, &NormalizeConfig::default());

        assert_eq!(segments.len(), 2);
        assert_eq!(index.len(), 6);
        assert_eq!(index.get(4).unwrap().text, "the");
        assert_eq!(index.get(4).unwrap().start_seconds, 4.0);
    }
}
