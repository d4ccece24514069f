use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogId, CatalogRecord, CatalogSummary},
    services::providers::{CatalogDetailProvider, CatalogSearchProvider},
};

/// Highest result page OMDb serves
pub const MAX_PAGE: u32 = 100;

/// Service function for title search
///
/// Validates the query and page before delegating to the configured provider.
pub async fn search_titles(
    provider: Arc<dyn CatalogSearchProvider>,
    query: &str,
    page: Option<u32>,
) -> AppResult<Vec<CatalogSummary>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    let page = page.unwrap_or(1);
    if !(1..=MAX_PAGE).contains(&page) {
        return Err(AppError::InvalidInput(format!(
            "Page must be between 1 and {}",
            MAX_PAGE
        )));
    }

    let results = provider.search(query, page).await?;

    tracing::info!(
        query = %query,
        page = page,
        results = results.len(),
        provider = provider.name(),
        "Title search completed"
    );

    Ok(results)
}

/// Full record for one title, `NotFound` when the catalog has no such id
pub async fn get_title(
    provider: Arc<dyn CatalogDetailProvider>,
    id: &str,
) -> AppResult<CatalogRecord> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::InvalidInput("Title id cannot be empty".to_string()));
    }

    provider
        .fetch_details(&CatalogId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Title {} not found", id)))
}
