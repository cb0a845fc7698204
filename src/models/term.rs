use serde::{Deserialize, Serialize};

use super::SeekRequest;

/// How a category's terms are located in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Token-window comparison against the word index
    Generic,
    /// Regex search over raw segment text, mapped back onto word positions
    Pattern,
}

/// Which family of analysis a category belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    Entity,
    Grammar,
    Sentiment,
    Search,
}

/// A named set of terms with its matching metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCategory {
    pub name: String,
    pub group: CategoryGroup,
    /// Compare terms to words without lower-casing either side
    pub case_sensitive: bool,
    pub strategy: MatchStrategy,
    #[serde(default)]
    pub description: String,
}

impl TermCategory {
    pub fn new(name: impl Into<String>, group: CategoryGroup) -> Self {
        Self {
            name: name.into(),
            group,
            case_sensitive: false,
            strategy: MatchStrategy::Generic,
            description: String::new(),
        }
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    pub fn pattern(mut self) -> Self {
        self.strategy = MatchStrategy::Pattern;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Free-text search category
    pub fn search() -> Self {
        Self::new(SEARCH_CATEGORY, CategoryGroup::Search)
            .describe("Free-text search over the transcript words")
    }
}

pub const SEARCH_CATEGORY: &str = "Search";

/// Candidate terms supplied for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermList {
    pub category: TermCategory,
    pub terms: Vec<String>,
}

impl TermList {
    pub fn new(category: TermCategory, terms: Vec<String>) -> Self {
        Self { category, terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// A located instance of a term in the word index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub term: String,
    /// First word position covered by the match
    pub word_index_start: usize,
    /// Last word position covered by the match (inclusive)
    pub word_index_end: usize,
    pub start_seconds: f64,
}

impl Occurrence {
    pub fn word_count(&self) -> usize {
        self.word_index_end - self.word_index_start + 1
    }

    pub fn overlaps(&self, other: &Occurrence) -> bool {
        self.word_index_start <= other.word_index_end
            && other.word_index_start <= self.word_index_end
    }

    pub fn seek(&self) -> SeekRequest {
        SeekRequest::new(self.start_seconds)
    }
}

/// Sort occurrences for display: by time, then by word position
pub fn sort_by_start(occurrences: &mut [Occurrence]) {
    occurrences.sort_by(|a, b| {
        a.start_seconds
            .total_cmp(&b.start_seconds)
            .then(a.word_index_start.cmp(&b.word_index_start))
    });
}

/// The categories a host offers for selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCatalog {
    categories: Vec<TermCategory>,
}

impl CategoryCatalog {
    pub fn new(categories: Vec<TermCategory>) -> Self {
        Self { categories }
    }

    /// Entity, grammar and sentiment categories
    pub fn builtin() -> Self {
        use CategoryGroup::{Entity, Grammar, Sentiment};

        let categories = vec![
            TermCategory::new("Person", Entity).describe("People mentioned by name"),
            TermCategory::new("Place", Entity).describe("Cities, countries and other locations"),
            TermCategory::new("Organization", Entity).describe("Companies, institutions and groups"),
            TermCategory::new("Date", Entity).describe("Dates and date expressions"),
            TermCategory::new("Money", Entity).describe("Monetary amounts"),
            TermCategory::new("Unit", Entity)
                .pattern()
                .describe("Measurements, durations, technical units and currency amounts"),
            TermCategory::new("Verb", Entity).describe("Actions"),
            TermCategory::new("Adjective", Entity).describe("Descriptive words"),
            TermCategory::new("Auxiliary", Grammar)
                .describe("Important for tense/voice (\"is\", \"have\", \"was\")"),
            TermCategory::new("Negative", Grammar)
                .describe("Crucial for detecting negation (\"not\", \"never\")"),
            TermCategory::new("Acronym", Grammar)
                .describe("Often represent key entities or topics (\"NASA\", \"FBI\")"),
            TermCategory::new("Adverb", Grammar)
                .describe("Adds context to actions (\"quickly\", \"seriously\")"),
            TermCategory::new("Determiner", Grammar)
                .describe("Helps in grammatical structure (\"the\", \"some\")"),
            TermCategory::new("Conjunction", Grammar)
                .describe("Connects ideas (\"and\", \"but\")"),
            TermCategory::new("Preposition", Grammar)
                .describe("Relationships between words (\"in\", \"on\", \"under\")"),
            TermCategory::new("QuestionWord", Grammar)
                .describe("Helps identify questions (\"why\", \"how\", \"what\")"),
            TermCategory::new("Pronoun", Grammar).describe("Keeps track of subjects (\"he\", \"they\")"),
            TermCategory::new("HashTag", Grammar)
                .case_sensitive()
                .describe("Social media hashtags and topic markers"),
            TermCategory::new("Abbreviation", Grammar)
                .case_sensitive()
                .describe("Shortened forms of words and phrases"),
            TermCategory::new("Url", Grammar)
                .case_sensitive()
                .describe("Website addresses and links"),
            TermCategory::new("PositiveSentiment", Sentiment)
                .describe("Words carrying positive sentiment"),
            TermCategory::new("NegativeSentiment", Sentiment)
                .describe("Words carrying negative sentiment"),
        ];

        Self { categories }
    }

    pub fn get(&self, name: &str) -> Option<&TermCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn categories(&self) -> &[TermCategory] {
        &self.categories
    }

    pub fn in_group(&self, group: CategoryGroup) -> impl Iterator<Item = &TermCategory> {
        self.categories.iter().filter(move |c| c.group == group)
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrence(start: usize, end: usize, seconds: f64) -> Occurrence {
        Occurrence {
            term: "t".to_string(),
            word_index_start: start,
            word_index_end: end,
            start_seconds: seconds,
        }
    }

    #[test]
    fn test_builtin_catalog_flags() {
        let catalog = CategoryCatalog::builtin();

        let unit = catalog.get("Unit").unwrap();
        assert_eq!(unit.strategy, MatchStrategy::Pattern);
        assert!(!unit.case_sensitive);

        for name in ["HashTag", "Abbreviation", "Url"] {
            assert!(catalog.get(name).unwrap().case_sensitive, "{name}");
        }
        assert!(!catalog.get("Person").unwrap().case_sensitive);
        assert!(catalog.get("Nope").is_none());
        assert_eq!(catalog.in_group(CategoryGroup::Sentiment).count(), 2);
    }

    #[test]
    fn test_occurrence_overlap() {
        let a = occurrence(0, 2, 0.0);
        assert!(a.overlaps(&occurrence(2, 3, 2.0)));
        assert!(!a.overlaps(&occurrence(3, 3, 3.0)));
        assert_eq!(a.word_count(), 3);
    }

    #[test]
    fn test_sort_by_start() {
        let mut list = vec![occurrence(5, 5, 4.0), occurrence(1, 1, 1.0), occurrence(0, 0, 1.0)];
        sort_by_start(&mut list);
        let starts: Vec<usize> = list.iter().map(|o| o.word_index_start).collect();
        assert_eq!(starts, vec![0, 1, 5]);
    }
}
