use regex::Regex;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use tokio_util::sync::CancellationToken;

use crate::{
    error::Cancelled,
    models::{CatalogSummary, Resolution, UnresolvedReason},
    services::providers::{CatalogDetailProvider, CatalogSearchProvider},
};

/// A pure rewrite of a candidate title, tried when the verbatim search finds nothing
pub type TitleVariant = fn(&str) -> String;

/// Fallback rewrites, in the order they are tried
pub const TITLE_VARIANTS: [TitleVariant; 3] =
    [strip_sequel_qualifier, strip_parentheticals, before_colon];

static SEQUEL_QUALIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i):\s*(?:the|part|chapter)\s+\d+").expect("sequel qualifier pattern is valid")
});

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(.*?\)").expect("parenthetical pattern is valid"));

/// "KGF: Chapter 1" -> "KGF"
pub fn strip_sequel_qualifier(title: &str) -> String {
    SEQUEL_QUALIFIER.replace(title, "").trim().to_string()
}

/// "Dangal (2016)" -> "Dangal"
pub fn strip_parentheticals(title: &str) -> String {
    PARENTHETICAL.replace_all(title, "").trim().to_string()
}

/// "Pushpa: The Rise" -> "Pushpa"
pub fn before_colon(title: &str) -> String {
    title
        .split_once(':')
        .map_or(title, |(head, _)| head)
        .trim()
        .to_string()
}

/// Queries to try for a trimmed candidate: the verbatim title, then each
/// variant that is non-empty and not already in the list
pub fn candidate_queries(title: &str) -> Vec<String> {
    let mut queries = vec![title.to_string()];

    for variant in TITLE_VARIANTS {
        let query = variant(title);
        if !query.is_empty() && !queries.contains(&query) {
            queries.push(query);
        }
    }

    queries
}

/// Picks the search hit that best matches `query`
///
/// Ranking, all case-insensitive:
/// 1. title equal to the query
/// 2. title containing the query, or the query containing the part of the
///    title before its first colon
/// 3. the first hit
///
/// Hits of equal rank are taken in provider order, so several exact matches
/// resolve to the one the provider listed first.
pub fn select_best_match<'a>(
    query: &str,
    hits: &'a [CatalogSummary],
) -> Option<&'a CatalogSummary> {
    ranked_match(query, hits).or_else(|| hits.first())
}

/// Exact or partial match for `wanted`, without the first-hit fallback
fn ranked_match<'a>(wanted: &str, hits: &'a [CatalogSummary]) -> Option<&'a CatalogSummary> {
    let wanted = wanted.trim().to_lowercase();

    hits.iter()
        .find(|hit| hit.title.trim().to_lowercase() == wanted)
        .or_else(|| hits.iter().find(|hit| is_partial_match(&wanted, &hit.title)))
}

fn is_partial_match(wanted: &str, title: &str) -> bool {
    let title = title.to_lowercase();
    let head = title.split_once(':').map_or(title.as_str(), |(head, _)| head).trim();

    title.contains(wanted) || (!head.is_empty() && wanted.contains(head))
}

/// Runs `fut` unless `cancel` fires first
pub(crate) async fn unless_cancelled<F>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, Cancelled>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Cancelled),
        output = fut => Ok(output),
    }
}

/// Resolves free-text titles to full catalog records
///
/// Searches the verbatim title, then the [`TITLE_VARIANTS`] in order until one
/// search returns hits. The best hit of that search is looked up in full.
/// Calls are strictly sequential and provider failures never escape: they
/// surface as [`UnresolvedReason`]s.
#[derive(Clone)]
pub struct TitleResolver {
    search: Arc<dyn CatalogSearchProvider>,
    details: Arc<dyn CatalogDetailProvider>,
}

impl TitleResolver {
    pub fn new(
        search: Arc<dyn CatalogSearchProvider>,
        details: Arc<dyn CatalogDetailProvider>,
    ) -> Self {
        Self { search, details }
    }

    pub async fn resolve(
        &self,
        candidate_title: &str,
        cancel: &CancellationToken,
    ) -> Result<Resolution, Cancelled> {
        let candidate = candidate_title.trim();
        if candidate.is_empty() {
            return Ok(Resolution::Unresolved(UnresolvedReason::EmptyInput));
        }

        let mut provider_failed = false;
        let mut matched = None;

        for query in candidate_queries(candidate) {
            match unless_cancelled(cancel, self.search.search(&query, 1)).await? {
                Ok(hits) if !hits.is_empty() => {
                    tracing::debug!(
                        candidate = %candidate,
                        query = %query,
                        hits = hits.len(),
                        "Title search matched"
                    );
                    matched = Some((query, hits));
                    break;
                }
                Ok(_) => {
                    tracing::debug!(candidate = %candidate, query = %query, "No search match");
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        candidate = %candidate,
                        query = %query,
                        "Title search failed, treating as no match"
                    );
                    provider_failed = true;
                }
            }
        }

        let Some((query, hits)) = matched else {
            let reason = if provider_failed {
                UnresolvedReason::ProviderUnavailable
            } else {
                UnresolvedReason::NoSearchMatch
            };
            tracing::info!(candidate = %candidate, reason = %reason, "Title unresolved");
            return Ok(Resolution::Unresolved(reason));
        };

        // Hits from a variant search are still ranked against the candidate
        // first, so an exact title match always wins.
        let best = ranked_match(candidate, &hits).or_else(|| select_best_match(&query, &hits));
        let Some(best) = best else {
            return Ok(Resolution::Unresolved(UnresolvedReason::NoSearchMatch));
        };

        match unless_cancelled(cancel, self.details.fetch_details(&best.id)).await? {
            Ok(Some(record)) => {
                tracing::info!(
                    candidate = %candidate,
                    title_id = %record.id,
                    title = %record.title,
                    "Title resolved"
                );
                Ok(Resolution::Resolved(record))
            }
            Ok(None) => {
                tracing::info!(
                    candidate = %candidate,
                    title_id = %best.id,
                    "Selected title not found in catalog"
                );
                Ok(Resolution::Unresolved(UnresolvedReason::DetailFetchFailed))
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    candidate = %candidate,
                    title_id = %best.id,
                    "Detail fetch failed"
                );
                Ok(Resolution::Unresolved(UnresolvedReason::ProviderUnavailable))
            }
        }
    }
}
