use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{AppError, AppResult},
    models::RecommendationSet,
    services::{
        providers::SuggestionGenerator, reconciler::SuggestionReconciler,
        title_resolver::unless_cancelled,
    },
};

/// Recommends catalog titles for a free-text prompt
///
/// The generator proposes titles, the reconciler turns them into catalog
/// records. A cancelled request fails with `AppError::Cancelled`.
pub async fn get_recommendations(
    generator: Arc<dyn SuggestionGenerator>,
    reconciler: &SuggestionReconciler,
    prompt: &str,
    cancel: &CancellationToken,
) -> AppResult<RecommendationSet> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::InvalidInput("Prompt cannot be empty".to_string()));
    }

    let suggestions = unless_cancelled(cancel, generator.suggest(prompt)).await?;
    tracing::info!(prompt = %prompt, suggestions = suggestions.len(), "Suggestions received");

    let set = reconciler.reconcile(prompt, &suggestions, cancel).await?;

    Ok(set)
}
