use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::{ConcordanceError, Result};
use crate::models::{Occurrence, Segment, TimedWordIndex};

/// Configuration for occurrence snippets
#[derive(Debug, Clone)]
pub struct SnippetConfig {
    /// Words shown on each side of the occurrence
    pub context_words: usize,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self { context_words: 10 }
    }
}

/// One row of an occurrence listing
#[derive(Debug, Clone, Serialize)]
pub struct OccurrenceRow {
    /// 1-based position in the time-sorted listing
    pub sequence: usize,
    pub term: String,
    pub word_index_start: usize,
    pub word_index_end: usize,
    pub start_seconds: f64,
    pub clock: String,
    pub snippet: String,
}

/// Occurrences for one category, ready for display or export
#[derive(Debug, Clone, Serialize)]
pub struct OccurrenceReport {
    pub category: String,
    pub total: usize,
    pub occurrences: Vec<OccurrenceRow>,
}

impl OccurrenceReport {
    /// Build a report from occurrences already sorted by start time
    pub fn new(
        category: &str,
        occurrences: &[Occurrence],
        index: &TimedWordIndex,
        config: &SnippetConfig,
    ) -> Self {
        let rows = occurrences
            .iter()
            .enumerate()
            .map(|(i, occurrence)| OccurrenceRow {
                sequence: i + 1,
                term: occurrence.term.clone(),
                word_index_start: occurrence.word_index_start,
                word_index_end: occurrence.word_index_end,
                start_seconds: occurrence.start_seconds,
                clock: format_clock(occurrence.start_seconds),
                snippet: context_snippet(index, occurrence.word_index_start, config.context_words),
            })
            .collect::<Vec<_>>();

        Self {
            category: category.to_string(),
            total: rows.len(),
            occurrences: rows,
        }
    }

    /// One line per occurrence: `#n [HH:MM:SS] term: snippet`
    pub fn format(&self) -> String {
        let mut output = format!("{} ({} occurrences)\n", self.category, self.total);
        for row in &self.occurrences {
            output.push_str(&format!(
                "#{} [{}] {}: {}\n",
                row.sequence, row.clock, row.term, row.snippet
            ));
        }
        output
    }
}

/// Format seconds as `HH:MM:SS`. Negative or non-finite input gives `00:00:00`.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00:00".to_string();
    }
    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Words within `context` positions either side of `position`, space-joined
pub fn context_snippet(index: &TimedWordIndex, position: usize, context: usize) -> String {
    if index.is_empty() {
        return String::new();
    }
    let start = position.saturating_sub(context);
    let end = position.saturating_add(context).min(index.len() - 1);
    if start > end {
        return String::new();
    }
    index.words()[start..=end]
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Human-readable transcript with timestamps and speaker labels
pub struct TranscriptRenderer<'a> {
    segments: &'a [Segment],
    width: usize,
}

impl<'a> TranscriptRenderer<'a> {
    pub fn new(segments: &'a [Segment]) -> Self {
        Self {
            segments,
            width: 80,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// `[HH:MM:SS] Speaker:` header followed by the wrapped text, per segment.
    /// `active` marks the segment under the playback cursor.
    pub fn format(&self, active: Option<usize>) -> String {
        let mut output = String::new();

        for (i, segment) in self.segments.iter().enumerate() {
            let marker = if active == Some(i) { "> " } else { "" };
            let speaker = segment.speaker.as_deref().unwrap_or("Speaker");
            output.push_str(&format!(
                "{}[{}] {}:\n",
                marker,
                format_clock(segment.start_seconds),
                speaker
            ));
            output.push_str(&wrap_text(&segment.text, self.width));
            output.push_str("\n\n");
        }

        output
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .map_err(|e| ConcordanceError::io(format!("creating {}", path.display()), e))?;
        write!(file, "{}", self.format(None))
            .map_err(|e| ConcordanceError::io(format!("writing {}", path.display()), e))?;
        Ok(())
    }
}

/// Serialize `value` as pretty JSON into `path`
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path)
        .map_err(|e| ConcordanceError::io(format!("creating {}", path.display()), e))?;
    serde_json::to_writer_pretty(file, value).map_err(|e| ConcordanceError::json("writing JSON", e))
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len + word_len + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word_len;
    }

    result
}
