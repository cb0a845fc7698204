use tracing::warn;

use crate::models::{Segment, Word};

/// Perform Stage 1: derive per-word timing for one segment.
///
/// Provided word timings pass through; a non-finite start falls back to the
/// segment start and a non-finite end to the word's own start. Otherwise the text is split on
/// whitespace and `[start, end)` is divided evenly between the tokens.
///
/// `end_seconds` is the segment's effective end (see
/// [`crate::models::effective_end`]). When the span is not a positive finite
/// number every boundary falls back to the segment start, so callers never
/// see NaN or infinite times.
pub fn interpolate_words(segment: &Segment, segment_index: usize, end_seconds: f64) -> Vec<Word> {
    let start = segment.start_seconds;

    if let Some(provided) = segment.provided_words() {
        return provided
            .iter()
            .map(|timing| {
                let word_start = finite_or(timing.start, start);
                Word {
                    text: timing.word.clone(),
                    start_seconds: word_start,
                    end_seconds: finite_or(timing.end, word_start),
                    segment_index,
                }
            })
            .collect();
    }

    let tokens: Vec<&str> = segment.text.split_whitespace().collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    let duration = end_seconds - start;
    let per_word = duration / tokens.len() as f64;
    let per_word = if per_word.is_finite() && per_word > 0.0 {
        per_word
    } else {
        if duration.is_finite() && duration < 0.0 {
            warn!(
                segment = segment_index,
                start, end_seconds, "inverted segment timing, collapsing words onto start"
            );
        }
        0.0
    };

    tokens
        .into_iter()
        .enumerate()
        .map(|(i, token)| Word {
            text: token.to_string(),
            start_seconds: finite_or(start + i as f64 * per_word, start),
            end_seconds: finite_or(start + (i + 1) as f64 * per_word, start),
            segment_index,
        })
        .collect()
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WordTiming;

    #[test]
    fn test_even_subdivision() {
        let segment = Segment::new("the cat sat", 0.0, 3.0);
        let words = interpolate_words(&segment, 0, 3.0);

        let spans: Vec<(&str, f64, f64)> = words
            .iter()
            .map(|w| (w.text.as_str(), w.start_seconds, w.end_seconds))
            .collect();
        assert_eq!(
            spans,
            vec![("the", 0.0, 1.0), ("cat", 1.0, 2.0), ("sat", 2.0, 3.0)]
        );
    }

    #[test]
    fn test_interpolation_is_contiguous_and_complete() {
        let segment = Segment::new("one two three four five six seven", 12.3, 19.7);
        let words = interpolate_words(&segment, 4, 19.7);

        assert_eq!(words.len(), 7);
        for pair in words.windows(2) {
            assert!((pair[0].end_seconds - pair[1].start_seconds).abs() < 1e-9);
        }
        let total: f64 = words.iter().map(Word::duration_seconds).sum();
        assert!((total - 7.4).abs() < 1e-9);
        assert!((words.last().unwrap().end_seconds - 19.7).abs() < 1e-9);
        assert!(words.iter().all(|w| w.segment_index == 4));
    }

    #[test]
    fn test_unbounded_end_falls_back_to_start() {
        let segment = Segment::open_ended("still talking here", 42.0);
        let words = interpolate_words(&segment, 0, f64::INFINITY);

        assert_eq!(words.len(), 3);
        for word in &words {
            assert_eq!(word.start_seconds, 42.0);
            assert_eq!(word.end_seconds, 42.0);
        }
    }

    #[test]
    fn test_inverted_and_zero_duration() {
        let inverted = Segment::new("a b", 10.0, 5.0);
        let zero = Segment::new("a b", 10.0, 10.0);

        for (segment, end) in [(&inverted, 5.0), (&zero, 10.0)] {
            let words = interpolate_words(segment, 0, end);
            assert!(words.iter().all(|w| w.start_seconds == 10.0 && w.end_seconds == 10.0));
        }
    }

    #[test]
    fn test_empty_text_yields_no_words() {
        let segment = Segment::new("   ", 0.0, 4.0);
        assert!(interpolate_words(&segment, 0, 4.0).is_empty());
    }

    #[test]
    fn test_provided_words_pass_through() {
        let segment = Segment::new("hello world", 0.0, 2.0).with_words(vec![
            WordTiming {
                word: "hello".to_string(),
                start: 0.1,
                end: 0.7,
            },
            WordTiming {
                word: "world".to_string(),
                start: 0.9,
                end: f64::NAN,
            },
        ]);
        let words = interpolate_words(&segment, 1, 2.0);

        assert_eq!(words[0].start_seconds, 0.1);
        assert_eq!(words[0].end_seconds, 0.7);
        assert_eq!(words[1].start_seconds, 0.9);
        assert_eq!(words[1].end_seconds, 0.9);
        assert_eq!(words[1].segment_index, 1);
    }
}
