use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::AppResult, middleware::RequestId, models::BrowseResponse, routes::AppState,
    services::browse,
};

/// Handler for the curated browse page
pub async fn browse(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
) -> AppResult<Json<BrowseResponse>> {
    tracing::debug!(request_id = %request_id, "Browse request");
    let page = browse::browse(state.search_provider.clone(), state.detail_provider.clone()).await?;
    Ok(Json(page))
}
