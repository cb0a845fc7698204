use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SeekRequest;

/// A segment record as delivered by the transcription backend.
///
/// Every field is loosely typed: times arrive as numbers or strings, text
/// may be missing, speakers may be numeric. The Normalizer turns this into
/// a [`Segment`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSegment {
    #[serde(default)]
    pub text: Option<Value>,
    /// Start time, numeric seconds or a time string
    #[serde(default)]
    pub start: Option<Value>,
    /// End time, numeric seconds or a time string
    #[serde(default)]
    pub end: Option<Value>,
    /// Pre-computed start in seconds
    #[serde(default)]
    pub start_seconds: Option<Value>,
    /// Pre-computed end in seconds
    #[serde(default)]
    pub end_seconds: Option<Value>,
    #[serde(default)]
    pub speaker: Option<Value>,
    /// Per-word timings, when the backend reports true word boundaries.
    /// Expected to be an array of [`RawWordTiming`] objects.
    #[serde(default)]
    pub words: Option<Value>,
}

/// A per-word timing as delivered by the backend, as loosely typed as
/// [`RawSegment`]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawWordTiming {
    #[serde(default)]
    pub word: Option<Value>,
    #[serde(default)]
    pub start: Option<Value>,
    #[serde(default)]
    pub end: Option<Value>,
}

/// A provided word timing after normalization. Times are always finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Canonical segment: numeric start, optional end, owned text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    /// Start time in seconds, always finite
    pub start_seconds: f64,
    /// End time in seconds; `None` means "until the next segment starts"
    pub end_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// Explicit per-word timings that bypass interpolation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordTiming>>,
}

impl Segment {
    pub fn new(text: impl Into<String>, start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            text: text.into(),
            start_seconds,
            end_seconds: Some(end_seconds),
            speaker: None,
            words: None,
        }
    }

    /// Segment with no reported end
    pub fn open_ended(text: impl Into<String>, start_seconds: f64) -> Self {
        Self {
            text: text.into(),
            start_seconds,
            end_seconds: None,
            speaker: None,
            words: None,
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    pub fn with_words(mut self, words: Vec<WordTiming>) -> Self {
        self.words = Some(words);
        self
    }

    /// Explicit word timings, if any were provided and non-empty
    pub fn provided_words(&self) -> Option<&[WordTiming]> {
        self.words
            .as_deref()
            .filter(|words| !words.is_empty())
    }

    /// Number of whitespace-delimited tokens in the text
    pub fn token_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn seek(&self) -> SeekRequest {
        SeekRequest::new(self.start_seconds)
    }
}

/// End of segment `index` for interval purposes.
///
/// The reported end if present, otherwise the next segment's start, otherwise
/// unbounded.
pub fn effective_end(segments: &[Segment], index: usize) -> f64 {
    let Some(segment) = segments.get(index) else {
        return f64::INFINITY;
    };
    segment
        .end_seconds
        .or_else(|| segments.get(index + 1).map(|next| next.start_seconds))
        .unwrap_or(f64::INFINITY)
}
