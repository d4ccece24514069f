use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod recommendation;
pub mod resolution;

pub use recommendation::{Diagnostic, RecommendationSet};
pub use resolution::{Resolution, UnresolvedReason};

/// OMDb marks absent fields with this literal instead of omitting them
const ABSENT: &str = "N/A";

/// Canonical catalog identifier (an IMDb id such as "tt0372784")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(pub String);

impl CatalogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CatalogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of catalog entry as reported by the search endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TitleKind {
    Movie,
    Series,
    Episode,
    Other,
}

/// One search hit, enough to render a card and look up the full record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogSummary {
    pub id: CatalogId,
    pub title: String,
    pub year: Option<String>,
    pub poster_url: Option<String>,
    pub kind: TitleKind,
}

/// Full catalog record for one title
///
/// Built from a provider response and never mutated afterwards. Every optional
/// field is display-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogRecord {
    pub id: CatalogId,
    pub title: String,
    pub year: Option<String>,
    pub poster_url: Option<String>,
    pub plot: Option<String>,
    pub genre: Option<String>,
    pub rating: Option<String>,
    pub rated: Option<String>,
    pub runtime: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub language: Option<String>,
}

impl CatalogRecord {
    /// Record with only the identifying fields set
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: CatalogId::new(id),
            title: title.into(),
            year: None,
            poster_url: None,
            plot: None,
            genre: None,
            rating: None,
            rated: None,
            runtime: None,
            director: None,
            actors: None,
            language: None,
        }
    }
}

/// AI-generated extras shown on a title's detail page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TitleInsights {
    pub storyline: Option<String>,
    pub age_rating: Option<String>,
}

/// One curated row on the browse page
#[derive(Debug, Clone, Serialize)]
pub struct BrowseRow {
    pub title: String,
    pub keyword: String,
    pub movies: Vec<CatalogSummary>,
}

/// Curated rows plus the featured title for the hero banner
#[derive(Debug, Clone, Serialize)]
pub struct BrowseResponse {
    pub rows: Vec<BrowseRow>,
    pub featured: Option<CatalogRecord>,
}

// ============================================================================
// OMDb API Types
// ============================================================================

/// Drops OMDb's "N/A" sentinel and blank strings
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| {
        let v = v.trim();
        !v.is_empty() && v != ABSENT
    })
}

fn is_true(flag: &str) -> bool {
    flag.eq_ignore_ascii_case("true")
}

/// Raw response from `GET /?s=<query>`
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Vec<serde_json::Value>,
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

impl OmdbSearchResponse {
    /// Hits that parse into summaries; "not found" yields an empty list
    pub fn into_summaries(self) -> Vec<CatalogSummary> {
        if !is_true(&self.response) {
            return Vec::new();
        }

        self.search
            .into_iter()
            .filter_map(|hit| serde_json::from_value::<OmdbSearchItem>(hit).ok())
            .filter(|item| !item.imdb_id.trim().is_empty())
            .map(CatalogSummary::from)
            .collect()
    }
}

/// One entry of an OMDb search response
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchItem {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub item_type: Option<String>,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

impl From<OmdbSearchItem> for CatalogSummary {
    fn from(item: OmdbSearchItem) -> Self {
        let kind = match item.item_type.as_deref() {
            Some("movie") => TitleKind::Movie,
            Some("series") => TitleKind::Series,
            Some("episode") => TitleKind::Episode,
            _ => TitleKind::Other,
        };

        CatalogSummary {
            id: CatalogId(item.imdb_id),
            title: item.title,
            year: present(item.year),
            poster_url: present(item.poster),
            kind,
        }
    }
}

/// Raw response from `GET /?i=<id>`
///
/// A miss comes back as `{"Response":"False","Error":"..."}`, so every field
/// other than `Response` is optional here.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbTitle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub rated: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub actors: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: Option<String>,
    pub response: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl OmdbTitle {
    /// Converts a found title into a record; `None` when OMDb reported a miss
    pub fn into_record(self) -> Option<CatalogRecord> {
        if !is_true(&self.response) {
            return None;
        }

        let id = present(self.imdb_id)?;
        let title = present(self.title)?;

        Some(CatalogRecord {
            id: CatalogId(id),
            title,
            year: present(self.year),
            poster_url: present(self.poster),
            plot: present(self.plot),
            genre: present(self.genre),
            rating: present(self.imdb_rating),
            rated: present(self.rated),
            runtime: present(self.runtime),
            director: present(self.director),
            actors: present(self.actors),
            language: present(self.language),
        })
    }
}

// ============================================================================
// Gemini API Types
// ============================================================================

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct GeminiContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Response body of `generateContent`
#[derive(Debug, Deserialize, Default)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize, Default)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: GeminiContent,
}

impl GeminiResponse {
    /// Text of the first part of the first candidate, if any
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.as_str())
            .filter(|text| !text.trim().is_empty())
    }
}
