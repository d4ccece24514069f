use chrono::{DateTime, Utc};
use serde::{ser::SerializeStruct, Serialize, Serializer};
use std::collections::HashSet;

use super::{CatalogId, CatalogRecord};

/// Non-fatal, user-facing note about a partial or empty recommendation set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// Some suggestions could not be matched and few records came back
    PartialResults { found: usize },
    /// Nothing could be matched at all
    NoResults,
}

impl Diagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::PartialResults { .. } => "partial_results",
            Diagnostic::NoResults => "no_results",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Diagnostic::PartialResults { found } => format!(
                "Found {} movie(s). Some titles may not be in the database.",
                found
            ),
            Diagnostic::NoResults => "No movies found. Try specific movie titles or popular films."
                .to_string(),
        }
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Diagnostic", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

/// Ordered, id-deduplicated records produced by one recommendation request
///
/// Records keep the order they were resolved in. The only way in is
/// [`RecommendationSet::insert`], which refuses ids already present.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationSet {
    records: Vec<CatalogRecord>,
    diagnostic: Option<Diagnostic>,
    failed_titles: Vec<String>,
    generated_at: DateTime<Utc>,
    #[serde(skip)]
    seen: HashSet<CatalogId>,
}

impl Default for RecommendationSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationSet {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            diagnostic: None,
            failed_titles: Vec::new(),
            generated_at: Utc::now(),
            seen: HashSet::new(),
        }
    }

    /// Appends the record unless its id is already present. Returns whether it was added.
    pub fn insert(&mut self, record: CatalogRecord) -> bool {
        if !self.seen.insert(record.id.clone()) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn record_failure(&mut self, title: impl Into<String>) {
        self.failed_titles.push(title.into());
    }

    pub fn set_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostic = Some(diagnostic);
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn diagnostic(&self) -> Option<Diagnostic> {
        self.diagnostic
    }

    pub fn failed_titles(&self) -> &[String] {
        &self.failed_titles
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_duplicate_ids() {
        let mut set = RecommendationSet::new();

        assert!(set.insert(CatalogRecord::new("tt0133093", "The Matrix")));
        assert!(set.insert(CatalogRecord::new("tt0234215", "The Matrix Reloaded")));
        assert!(!set.insert(CatalogRecord::new("tt0133093", "The Matrix (re-release)")));

        assert_eq!(set.len(), 2);
        assert_eq!(set.records()[0].title, "The Matrix");
        assert_eq!(set.records()[1].title, "The Matrix Reloaded");
    }

    #[test]
    fn test_serialization_shape() {
        let mut set = RecommendationSet::new();
        set.insert(CatalogRecord::new("tt2543164", "Arrival"));
        set.record_failure("Nonexistent Film Xyzzy123");
        set.set_diagnostic(Diagnostic::PartialResults { found: 1 });

        let json = serde_json::to_value(&set).unwrap();

        assert_eq!(json["records"][0]["id"], "tt2543164");
        assert_eq!(json["failed_titles"][0], "Nonexistent Film Xyzzy123");
        assert_eq!(json["diagnostic"]["kind"], "partial_results");
        assert_eq!(
            json["diagnostic"]["message"],
            "Found 1 movie(s). Some titles may not be in the database."
        );
        assert!(json.get("seen").is_none());
        assert!(json["generated_at"].is_string());
    }

    #[test]
    fn test_no_diagnostic_serializes_as_null() {
        let set = RecommendationSet::new();
        let json = serde_json::to_value(&set).unwrap();
        assert!(json["diagnostic"].is_null());
        assert!(set.is_empty());
    }
}
