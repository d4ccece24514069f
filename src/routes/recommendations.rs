use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    error::AppResult, middleware::RequestId, models::RecommendationSet, routes::AppState,
    services::recommendations,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub prompt: String,
    /// Requests sharing a session supersede each other
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationSet>> {
    tracing::info!(
        request_id = %request_id,
        session_id = ?request.session_id,
        active_sessions = state.sessions.active_sessions(),
        "Recommendation request"
    );

    // Held until the handler returns or is dropped; releases the session either way
    let ticket = request
        .session_id
        .as_deref()
        .map(|session_id| state.sessions.begin(session_id));
    let cancel = ticket
        .as_ref()
        .map(|ticket| ticket.token().clone())
        .unwrap_or_else(CancellationToken::new);

    let result = recommendations::get_recommendations(
        state.suggestion_generator.clone(),
        &state.reconciler,
        &request.prompt,
        &cancel,
    )
    .await;

    if result.is_err() && cancel.is_cancelled() {
        tracing::info!(request_id = %request_id, "Recommendation request superseded");
    }

    Ok(Json(result?))
}
