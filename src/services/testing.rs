//! In-memory catalog used by the service tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogId, CatalogRecord, CatalogSummary, TitleKind},
    services::providers::{CatalogDetailProvider, CatalogSearchProvider},
};

/// Scripted catalog: searches answer from an exact (case-insensitive) query
/// table, details from a record table. Every call is logged.
#[derive(Default)]
pub struct FakeCatalog {
    search_results: HashMap<String, Vec<CatalogSummary>>,
    records: HashMap<CatalogId, CatalogRecord>,
    failing_queries: HashSet<String>,
    cancel_on_search: Option<(String, CancellationToken)>,
    searches: Mutex<Vec<String>>,
    detail_fetches: Mutex<Vec<CatalogId>>,
}

pub fn summary(id: &str, title: &str) -> CatalogSummary {
    CatalogSummary {
        id: CatalogId::new(id),
        title: title.to_string(),
        year: None,
        poster_url: None,
        kind: TitleKind::Movie,
    }
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers search hits for `query`; the hits themselves are not resolvable
    /// until added with [`FakeCatalog::with_record`].
    pub fn with_search(mut self, query: &str, hits: &[(&str, &str)]) -> Self {
        self.search_results.insert(
            query.to_lowercase(),
            hits.iter().map(|(id, title)| summary(id, title)).collect(),
        );
        self
    }

    pub fn with_record(mut self, id: &str, title: &str) -> Self {
        self.records
            .insert(CatalogId::new(id), CatalogRecord::new(id, title));
        self
    }

    /// Search hits for `query` that are all resolvable
    pub fn with_movies(self, query: &str, hits: &[(&str, &str)]) -> Self {
        let catalog = self.with_search(query, hits);
        hits.iter()
            .fold(catalog, |catalog, (id, title)| catalog.with_record(id, title))
    }

    /// Searching for `query` fails with a transport error
    pub fn with_failing_search(mut self, query: &str) -> Self {
        self.failing_queries.insert(query.to_lowercase());
        self
    }

    /// Searching for `query` cancels `token` before answering
    pub fn cancelling_on(mut self, query: &str, token: CancellationToken) -> Self {
        self.cancel_on_search = Some((query.to_lowercase(), token));
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn detail_fetches(&self) -> Vec<CatalogId> {
        self.detail_fetches.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CatalogSearchProvider for FakeCatalog {
    async fn search(&self, query: &str, _page: u32) -> AppResult<Vec<CatalogSummary>> {
        self.searches.lock().unwrap().push(query.to_string());
        let key = query.to_lowercase();

        if let Some((trigger, token)) = &self.cancel_on_search {
            if *trigger == key {
                token.cancel();
            }
        }

        if self.failing_queries.contains(&key) {
            return Err(AppError::ExternalApi("connection reset".to_string()));
        }

        Ok(self.search_results.get(&key).cloned().unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[async_trait::async_trait]
impl CatalogDetailProvider for FakeCatalog {
    async fn fetch_details(&self, id: &CatalogId) -> AppResult<Option<CatalogRecord>> {
        self.detail_fetches.lock().unwrap().push(id.clone());
        Ok(self.records.get(id).cloned())
    }
}
