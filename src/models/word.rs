use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A single token with derived or provided timing, owned by one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    /// Start time in seconds (inclusive)
    pub start_seconds: f64,
    /// End time in seconds (exclusive)
    pub end_seconds: f64,
    /// Index of the owning segment
    pub segment_index: usize,
}

impl Word {
    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Half-open containment: `start <= time < end`
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_seconds && time < self.end_seconds
    }
}

/// A request for the playback transport to move to `time_seconds`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeekRequest {
    pub time_seconds: f64,
}

impl SeekRequest {
    pub fn new(time_seconds: f64) -> Self {
        Self { time_seconds }
    }
}

/// Flat, time-ordered sequence of every word across all segments.
///
/// Rebuilt from scratch whenever the segment list changes; never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimedWordIndex {
    words: Vec<Word>,
    /// Word range owned by each segment, by segment index
    #[serde(skip)]
    segment_ranges: Vec<Range<usize>>,
}

impl TimedWordIndex {
    /// Assemble an index from words already in segment order.
    ///
    /// `segment_count` is the length of the source segment list, so segments
    /// that contributed no words still get an (empty) range.
    pub fn from_words(words: Vec<Word>, segment_count: usize) -> Self {
        let mut segment_ranges = vec![0..0; segment_count];
        let mut cursor = 0;
        for (segment_index, range) in segment_ranges.iter_mut().enumerate() {
            let start = cursor;
            while cursor < words.len() && words[cursor].segment_index == segment_index {
                cursor += 1;
            }
            *range = start..cursor;
        }
        Self {
            words,
            segment_ranges,
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn get(&self, position: usize) -> Option<&Word> {
        self.words.get(position)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Word> {
        self.words.iter()
    }

    /// Number of segments the index was built from
    pub fn segment_count(&self) -> usize {
        self.segment_ranges.len()
    }

    /// Positions of the words owned by `segment_index`
    pub fn segment_words(&self, segment_index: usize) -> Range<usize> {
        self.segment_ranges
            .get(segment_index)
            .cloned()
            .unwrap_or(0..0)
    }

    /// Position of the first word of `segment_index`, if it has any words
    pub fn segment_first_word(&self, segment_index: usize) -> Option<usize> {
        let range = self.segment_words(segment_index);
        (!range.is_empty()).then_some(range.start)
    }

    /// Total span from the first word's start to the last word's end
    pub fn duration_seconds(&self) -> f64 {
        match (self.words.first(), self.words.last()) {
            (Some(first), Some(last)) => (last.end_seconds - first.start_seconds).max(0.0),
            _ => 0.0,
        }
    }

    pub fn seek_to_word(&self, position: usize) -> Option<SeekRequest> {
        self.words
            .get(position)
            .map(|word| SeekRequest::new(word.start_seconds))
    }
}

impl<'a> IntoIterator for &'a TimedWordIndex {
    type Item = &'a Word;
    type IntoIter = std::slice::Iter<'a, Word>;

    fn into_iter(self) -> Self::IntoIter {
        self.words.iter()
    }
}
