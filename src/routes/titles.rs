use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{CatalogRecord, CatalogSummary, TitleInsights},
    routes::AppState,
    services::{insights, title_search},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    page: Option<u32>,
}

/// Handler for title search endpoint
pub async fn search(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<CatalogSummary>>> {
    tracing::debug!(request_id = %request_id, query = %params.q, "Search request");
    let titles =
        title_search::search_titles(state.search_provider.clone(), &params.q, params.page).await?;
    Ok(Json(titles))
}

/// Handler for title details endpoint
pub async fn details(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> AppResult<Json<CatalogRecord>> {
    tracing::debug!(request_id = %request_id, title_id = %id, "Details request");
    let record = title_search::get_title(state.detail_provider.clone(), &id).await?;
    Ok(Json(record))
}

/// Handler for AI storyline and age rating
pub async fn insights(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> AppResult<Json<TitleInsights>> {
    tracing::debug!(request_id = %request_id, title_id = %id, "Insights request");
    let insights = insights::get_insights(
        state.detail_provider.clone(),
        state.insight_generator.clone(),
        &id,
    )
    .await?;
    Ok(Json(insights))
}
