use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{RawSegment, RawWordTiming, Segment, WordTiming};

/// Configuration for segment normalization
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Round times read from the `start`/`end` fields to whole seconds.
    /// `start_seconds`/`end_seconds` are never rounded.
    pub round_derived_times: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            round_derived_times: true,
        }
    }
}

/// Result of Stage 0 normalization
#[derive(Debug, Clone)]
pub struct NormalizationResult {
    /// Canonical segments, in input order
    pub segments: Vec<Segment>,
    /// Segments whose text was missing or not a string
    pub malformed_segments: Vec<usize>,
    /// Segments whose start could not be read and defaulted to 0
    pub defaulted_starts: Vec<usize>,
}

/// Perform Stage 0: coerce loosely-typed segment records into canonical form.
///
/// Never fails and never reorders. Bad fields degrade:
/// - missing or non-string text becomes empty (the segment yields no words)
/// - an unreadable start becomes 0
/// - an unreadable end becomes `None`, resolved later against the next segment
pub fn normalize(raw_segments: &[RawSegment], config: &NormalizeConfig) -> NormalizationResult {
    let mut segments = Vec::with_capacity(raw_segments.len());
    let mut malformed_segments = Vec::new();
    let mut defaulted_starts = Vec::new();

    for (index, raw) in raw_segments.iter().enumerate() {
        // Text: anything but a string leaves the segment wordless
        let text = match raw.text.as_ref() {
            Some(Value::String(text)) => text.clone(),
            other => {
                warn!(segment = index, text = ?other, "segment has no usable text");
                malformed_segments.push(index);
                String::new()
            }
        };

        // Times: numeric before string, seconds field before derived field
        let start_seconds = match resolve_time(
            raw.start_seconds.as_ref(),
            raw.start.as_ref(),
            config.round_derived_times,
        ) {
            Some(start) => start,
            None => {
                if raw.start_seconds.is_some() || raw.start.is_some() {
                    warn!(segment = index, "unreadable start time, defaulting to 0");
                }
                defaulted_starts.push(index);
                0.0
            }
        };

        let end_seconds = resolve_time(
            raw.end_seconds.as_ref(),
            raw.end.as_ref(),
            config.round_derived_times,
        );
        if end_seconds.is_none() && (raw.end_seconds.is_some() || raw.end.is_some()) {
            warn!(segment = index, "unreadable end time, inferring from next segment");
        }

        // Provided word timings, if any survive coercion
        let words = raw
            .words
            .as_ref()
            .and_then(|words| normalize_words(words, index, start_seconds));

        segments.push(Segment {
            text,
            start_seconds,
            end_seconds,
            speaker: raw.speaker.as_ref().and_then(text_label),
            words,
        });
    }

    debug!(
        segments = segments.len(),
        malformed = malformed_segments.len(),
        defaulted_starts = defaulted_starts.len(),
        "normalized segments"
    );

    NormalizationResult {
        segments,
        malformed_segments,
        defaulted_starts,
    }
}

/// Normalize with the default configuration, keeping only the segments
pub fn normalize_segments(raw_segments: &[RawSegment]) -> Vec<Segment> {
    normalize(raw_segments, &NormalizeConfig::default()).segments
}

/// Pick a time from the pre-computed seconds field or the derived field.
///
/// Numeric values win over strings; within each kind the seconds field wins.
fn resolve_time(seconds_field: Option<&Value>, derived_field: Option<&Value>, round: bool) -> Option<f64> {
    let derived = |value: f64| if round { value.round() } else { value };

    seconds_field
        .and_then(numeric_value)
        .or_else(|| derived_field.and_then(numeric_value).map(derived))
        .or_else(|| seconds_field.and_then(string_value))
        .or_else(|| derived_field.and_then(string_value).map(derived))
}

fn numeric_value(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn string_value(value: &Value) -> Option<f64> {
    value.as_str().and_then(parse_time_str)
}

fn time_value(value: &Value) -> Option<f64> {
    numeric_value(value).or_else(|| string_value(value))
}

/// Parse decimal seconds (`"12.5"`) or clock time (`"MM:SS"`, `"HH:MM:SS.mmm"`).
///
/// A comma is accepted as the decimal separator, as in SRT timestamps.
pub fn parse_time_str(input: &str) -> Option<f64> {
    let input = input.trim().replace(',', ".");
    if input.is_empty() {
        return None;
    }

    if !input.contains(':') {
        return input.parse::<f64>().ok().filter(|v| v.is_finite());
    }

    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() > 3 {
        return None;
    }

    let mut total = 0.0;
    for part in &parts {
        let value = part.trim().parse::<f64>().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        total = total * 60.0 + value;
    }
    Some(total)
}

/// A non-blank string, or a number rendered as a string
fn text_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce provided word timings.
///
/// Entries that are not objects or carry no usable word are dropped. A
/// missing start falls back to the segment start, a missing end to the
/// word's own start. Returns `None` when `words` is not an array.
fn normalize_words(words: &Value, segment: usize, segment_start: f64) -> Option<Vec<WordTiming>> {
    let Value::Array(items) = words else {
        warn!(segment, "ignoring word timings that are not an array");
        return None;
    };

    let mut timings = Vec::with_capacity(items.len());
    for item in items {
        let Ok(raw) = RawWordTiming::deserialize(item) else {
            debug!(segment, entry = ?item, "dropping malformed word timing");
            continue;
        };
        let Some(word) = raw.word.as_ref().and_then(text_label) else {
            debug!(segment, "dropping word timing without a word");
            continue;
        };
        let start = raw.start.as_ref().and_then(time_value).unwrap_or(segment_start);
        let end = raw.end.as_ref().and_then(time_value).unwrap_or(start);
        timings.push(WordTiming { word, start, end });
    }
    Some(timings)
}
