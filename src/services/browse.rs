use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{BrowseResponse, BrowseRow, CatalogSummary},
    services::providers::{CatalogDetailProvider, CatalogSearchProvider},
};

/// Curated rows on the browse page: (row title, search keyword)
pub const BROWSE_ROWS: [(&str, &str); 4] = [
    ("Trending Movies", "batman"),
    ("Popular Movies", "avengers"),
    ("Latest Movies", "2024"),
    ("Action Movies", "mission"),
];

/// Builds the browse page
///
/// Every row is searched in its own task. A row whose search fails is logged
/// and comes back empty rather than failing the page.
pub async fn browse(
    search: Arc<dyn CatalogSearchProvider>,
    details: Arc<dyn CatalogDetailProvider>,
) -> AppResult<BrowseResponse> {
    let mut tasks = Vec::new();

    for (_, keyword) in BROWSE_ROWS {
        let search = search.clone();
        let task = tokio::spawn(async move { search.search(keyword, 1).await });
        tasks.push(task);
    }

    // Collect results
    let mut rows = Vec::with_capacity(BROWSE_ROWS.len());
    let mut error_count = 0;

    for ((title, keyword), task) in BROWSE_ROWS.into_iter().zip(tasks) {
        let movies = match task.await {
            Ok(Ok(movies)) => movies,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, keyword = %keyword, "Browse row search failed");
                error_count += 1;
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, keyword = %keyword, "Browse row task panicked");
                error_count += 1;
                Vec::new()
            }
        };

        rows.push(BrowseRow {
            title: title.to_string(),
            keyword: keyword.to_string(),
            movies,
        });
    }

    let featured = match rows.first().and_then(|row| row.movies.first()) {
        Some(CatalogSummary { id, .. }) => match details.fetch_details(id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, title_id = %id, "Featured title fetch failed");
                None
            }
        },
        None => None,
    };

    tracing::info!(
        rows = rows.len(),
        failed_rows = error_count,
        featured = featured.is_some(),
        "Browse page assembled"
    );

    Ok(BrowseResponse { rows, featured })
}
