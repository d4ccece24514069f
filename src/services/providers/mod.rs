/// Catalog and generator abstractions
///
/// The resolution logic only talks to these traits. `omdb` and `gemini` are the
/// HTTP implementations; `cached` layers the Redis cache over any catalog.
use crate::{
    error::AppResult,
    models::{CatalogId, CatalogRecord, CatalogSummary},
};

pub mod cached;
pub mod gemini;
pub mod omdb;

/// Title search against the external catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSearchProvider: Send + Sync {
    /// Searches titles by free text
    ///
    /// "Not found" is an empty list. `Err` is reserved for transport or
    /// protocol failures.
    async fn search(&self, query: &str, page: u32) -> AppResult<Vec<CatalogSummary>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Full-record lookup by canonical identifier
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogDetailProvider: Send + Sync {
    /// Fetches the full record, `None` when the catalog reports it as not found
    async fn fetch_details(&self, id: &CatalogId) -> AppResult<Option<CatalogRecord>>;
}

/// Maps a free-text prompt to candidate movie titles
///
/// Implementations absorb their own failures: an unusable answer is an empty list.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SuggestionGenerator: Send + Sync {
    async fn suggest(&self, prompt: &str) -> Vec<String>;
}

/// Generates detail-page extras for a title
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Short spoiler-free plot summary
    async fn storyline(&self, title: &str) -> Option<String>;

    /// Age restriction such as "PG-13" or "18+"
    async fn age_rating(&self, title: &str) -> Option<String>;
}
