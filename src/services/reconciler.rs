use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    error::Cancelled,
    models::{
        CatalogId, CatalogRecord, CatalogSummary, Diagnostic, RecommendationSet, Resolution,
        UnresolvedReason,
    },
    services::{
        providers::{CatalogDetailProvider, CatalogSearchProvider},
        title_resolver::{unless_cancelled, TitleResolver},
    },
};

/// Suggestions beyond this many are ignored
pub const MAX_SUGGESTIONS: usize = 10;

/// Keyword-search hits looked up in full when falling back to the raw prompt
pub const KEYWORD_FALLBACK_LIMIT: usize = 6;

/// Below this many records, failed suggestions are reported as partial results
pub const PARTIAL_RESULTS_THRESHOLD: usize = 3;

/// Turns generator suggestions into a deduplicated [`RecommendationSet`]
///
/// Each suggestion goes through the [`TitleResolver`]; an unresolved one gets a
/// second chance as a plain keyword search. When nothing at all comes back,
/// the raw prompt is used as a keyword search instead. No state is kept between
/// calls.
#[derive(Clone)]
pub struct SuggestionReconciler {
    resolver: TitleResolver,
    search: Arc<dyn CatalogSearchProvider>,
    details: Arc<dyn CatalogDetailProvider>,
}

impl SuggestionReconciler {
    pub fn new(
        search: Arc<dyn CatalogSearchProvider>,
        details: Arc<dyn CatalogDetailProvider>,
    ) -> Self {
        Self {
            resolver: TitleResolver::new(search.clone(), details.clone()),
            search,
            details,
        }
    }

    /// Builds the recommendation set for one request
    ///
    /// Suggestions are handled one at a time, in order. If `cancel` fires at
    /// any point before the set is handed back, the partially built set is
    /// dropped and `Err(Cancelled)` is returned.
    pub async fn reconcile(
        &self,
        raw_prompt: &str,
        suggested_titles: &[String],
        cancel: &CancellationToken,
    ) -> Result<RecommendationSet, Cancelled> {
        let set = self.build(raw_prompt, suggested_titles, cancel).await?;

        if cancel.is_cancelled() {
            tracing::debug!(prompt = %raw_prompt, "Cancelled after the last provider call");
            return Err(Cancelled);
        }

        Ok(set)
    }

    async fn build(
        &self,
        raw_prompt: &str,
        suggested_titles: &[String],
        cancel: &CancellationToken,
    ) -> Result<RecommendationSet, Cancelled> {
        if suggested_titles.is_empty() {
            tracing::info!(prompt = %raw_prompt, "No suggestions, searching the prompt directly");
            return self
                .keyword_fallback(raw_prompt, RecommendationSet::new(), cancel)
                .await;
        }

        let mut set = RecommendationSet::new();

        for title in suggested_titles.iter().take(MAX_SUGGESTIONS) {
            match self.resolver.resolve(title, cancel).await? {
                Resolution::Resolved(record) => {
                    let id = record.id.clone();
                    if !set.insert(record) {
                        tracing::debug!(title = %title, title_id = %id, "Duplicate suggestion skipped");
                    }
                }
                Resolution::Unresolved(UnresolvedReason::EmptyInput) => {
                    tracing::debug!("Blank suggestion skipped");
                }
                Resolution::Unresolved(reason) => {
                    tracing::debug!(
                        title = %title,
                        reason = %reason,
                        "Suggestion unresolved, retrying as keyword search"
                    );
                    match self.first_keyword_match(title.trim(), cancel).await? {
                        Some(record) => {
                            set.insert(record);
                        }
                        None => set.record_failure(title.trim()),
                    }
                }
            }
        }

        if set.is_empty() {
            tracing::info!(
                prompt = %raw_prompt,
                failed = set.failed_titles().len(),
                "No suggestion resolved, searching the prompt directly"
            );
            return self.keyword_fallback(raw_prompt, set, cancel).await;
        }

        if set.len() < PARTIAL_RESULTS_THRESHOLD && !set.failed_titles().is_empty() {
            set.set_diagnostic(Diagnostic::PartialResults { found: set.len() });
        }

        tracing::info!(
            suggestions = suggested_titles.len(),
            resolved = set.len(),
            failed = set.failed_titles().len(),
            "Recommendations reconciled"
        );

        Ok(set)
    }

    /// Keyword search on `query`, keeping the first hit whose details can be fetched
    async fn first_keyword_match(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogRecord>, Cancelled> {
        for hit in self.keyword_hits(query, cancel).await? {
            if let Some(record) = self.fetch_record(&hit.id, cancel).await? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Fills `set` with up to [`KEYWORD_FALLBACK_LIMIT`] records found by
    /// searching `query` directly; marks the set `NoResults` if none
    async fn keyword_fallback(
        &self,
        query: &str,
        mut set: RecommendationSet,
        cancel: &CancellationToken,
    ) -> Result<RecommendationSet, Cancelled> {
        let hits = self.keyword_hits(query.trim(), cancel).await?;

        for hit in hits.iter().take(KEYWORD_FALLBACK_LIMIT) {
            if let Some(record) = self.fetch_record(&hit.id, cancel).await? {
                set.insert(record);
            }
        }

        if set.is_empty() {
            tracing::info!(query = %query, "Keyword fallback found nothing");
            set.set_diagnostic(Diagnostic::NoResults);
        }

        Ok(set)
    }

    /// Search hits for `query`; failures and blank queries are treated as no hits
    async fn keyword_hits(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogSummary>, Cancelled> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        match unless_cancelled(cancel, self.search.search(query, 1)).await? {
            Ok(hits) => Ok(hits),
            Err(e) => {
                tracing::warn!(error = %e, query = %query, "Keyword search failed");
                Ok(Vec::new())
            }
        }
    }

    async fn fetch_record(
        &self,
        id: &CatalogId,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogRecord>, Cancelled> {
        match unless_cancelled(cancel, self.details.fetch_details(id)).await? {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::warn!(error = %e, title_id = %id, "Detail fetch failed");
                Ok(None)
            }
        }
    }
}
