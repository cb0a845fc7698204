use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{MatchStrategy, TermCategory};
use crate::patterns::extract_pattern_terms;

/// Supplies candidate terms for a category.
///
/// Implementations wrap whatever tagger or lexicon identifies the terms; the
/// engine treats the strings as opaque.
pub trait TermProvider: Send + Sync {
    fn terms(&self, category: &TermCategory, transcript_text: &str) -> Vec<String>;
}

/// Fixed per-category term lists, e.g. precomputed by an external tagger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticTermProvider {
    lists: HashMap<String, Vec<String>>,
}

impl StaticTermProvider {
    pub fn new(lists: HashMap<String, Vec<String>>) -> Self {
        Self { lists }
    }

    pub fn insert(&mut self, category: impl Into<String>, terms: Vec<String>) {
        self.lists.insert(category.into(), terms);
    }

    pub fn with(mut self, category: impl Into<String>, terms: &[&str]) -> Self {
        self.insert(category, terms.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }
}

impl TermProvider for StaticTermProvider {
    fn terms(&self, category: &TermCategory, transcript_text: &str) -> Vec<String> {
        match self.lists.get(&category.name) {
            Some(terms) => terms.clone(),
            None if category.strategy == MatchStrategy::Pattern => {
                extract_pattern_terms(transcript_text)
            }
            None => Vec::new(),
        }
    }
}

/// Terms for pattern categories, read straight from the transcript text
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternTermProvider;

impl TermProvider for PatternTermProvider {
    fn terms(&self, _category: &TermCategory, transcript_text: &str) -> Vec<String> {
        extract_pattern_terms(transcript_text)
    }
}

/// Trim, drop terms shorter than `min_chars`, and de-duplicate keeping the
/// first occurrence.
pub fn prepare_terms(raw: &[String], min_chars: usize) -> Vec<String> {
    let mut prepared: Vec<String> = Vec::with_capacity(raw.len());
    for term in raw {
        let term = term.trim();
        if term.chars().count() < min_chars {
            continue;
        }
        if !prepared.iter().any(|t| t == term) {
            prepared.push(term.to_string());
        }
    }
    prepared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryCatalog, CategoryGroup};

    #[test]
    fn test_static_lists() {
        let provider = StaticTermProvider::default().with("Person", &["Ada", "Grace"]);
        let person = TermCategory::new("Person", CategoryGroup::Entity);
        let place = TermCategory::new("Place", CategoryGroup::Entity);

        assert_eq!(provider.terms(&person, ""), vec!["Ada".to_string(), "Grace".to_string()]);
        assert!(provider.terms(&place, "").is_empty());
    }

    #[test]
    fn test_pattern_fallback() {
        let provider = StaticTermProvider::default();
        let catalog = CategoryCatalog::builtin();
        let unit = catalog.get("Unit").unwrap();

        assert_eq!(provider.terms(unit, "ran 5 km"), vec!["5 km".to_string()]);
        assert_eq!(PatternTermProvider.terms(unit, "ran 5 km"), vec!["5 km".to_string()]);
    }

    #[test]
    fn test_deserialize_from_object() {
        let provider: StaticTermProvider =
            serde_json::from_str(r#"{"Place": ["Paris", "new york"]}"#).unwrap();
        assert_eq!(provider.categories().collect::<Vec<_>>(), vec!["Place"]);
    }

    #[test]
    fn test_prepare_terms() {
        let raw: Vec<String> = [" Paris ", "Paris", "x", "", "new york"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(prepare_terms(&raw, 2), vec!["Paris".to_string(), "new york".to_string()]);
    }
}
