use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ConcordanceError, Result};
use crate::models::{RawSegment, Segment};
use crate::providers::StaticTermProvider;
use crate::stages::{NormalizeConfig, normalize};

/// Shapes a segment document may take
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SegmentDocument {
    List(Vec<RawSegment>),
    Wrapped {
        #[serde(alias = "segments")]
        transcription: Vec<RawSegment>,
    },
}

/// Parse a segments JSON file
pub fn parse_segments_file(path: &Path) -> Result<Vec<RawSegment>> {
    let content = read_file(path)?;
    parse_segments_json(&content)
}

/// Parse segments from a bare array or an object wrapping the array under
/// `transcription` or `segments`
pub fn parse_segments_json(json: &str) -> Result<Vec<RawSegment>> {
    let document: SegmentDocument =
        serde_json::from_str(json).map_err(|e| ConcordanceError::json("parsing segment list", e))?;
    Ok(match document {
        SegmentDocument::List(segments) => segments,
        SegmentDocument::Wrapped { transcription } => transcription,
    })
}

/// Parse and normalize a segments file
pub fn load_segments(path: &Path, config: &NormalizeConfig) -> Result<Vec<Segment>> {
    let raw = parse_segments_file(path)?;
    Ok(normalize(&raw, config).segments)
}

/// Parse a term list file: a JSON object mapping category names to arrays
/// of terms. Non-string entries are skipped.
pub fn parse_terms_file(path: &Path) -> Result<StaticTermProvider> {
    let content = read_file(path)?;
    parse_terms_json(&content)
}

pub fn parse_terms_json(json: &str) -> Result<StaticTermProvider> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ConcordanceError::json("parsing term lists", e))?;
    let Value::Object(map) = value else {
        return Err(ConcordanceError::invalid_input(
            "term lists must be an object of category -> [terms]",
        ));
    };

    let mut provider = StaticTermProvider::default();
    for (category, terms) in map {
        let Value::Array(items) = terms else {
            return Err(ConcordanceError::invalid_input(format!(
                "terms for category {category} must be an array"
            )));
        };
        let terms = items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect();
        provider.insert(category, terms);
    }
    Ok(provider)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ConcordanceError::io(format!("reading {}", path.display()), e))
}
