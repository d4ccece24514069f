use std::sync::Arc;

use crate::services::{
    providers::{
        CatalogDetailProvider, CatalogSearchProvider, InsightGenerator, SuggestionGenerator,
    },
    SessionRegistry, SuggestionReconciler,
};

/// Shared application state
pub struct AppState {
    pub search_provider: Arc<dyn CatalogSearchProvider>,
    pub detail_provider: Arc<dyn CatalogDetailProvider>,
    pub suggestion_generator: Arc<dyn SuggestionGenerator>,
    pub insight_generator: Arc<dyn InsightGenerator>,
    pub reconciler: SuggestionReconciler,
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Wires the reconciler and session registry around the given collaborators
    pub fn new(
        search_provider: Arc<dyn CatalogSearchProvider>,
        detail_provider: Arc<dyn CatalogDetailProvider>,
        suggestion_generator: Arc<dyn SuggestionGenerator>,
        insight_generator: Arc<dyn InsightGenerator>,
    ) -> Self {
        Self {
            reconciler: SuggestionReconciler::new(search_provider.clone(), detail_provider.clone()),
            search_provider,
            detail_provider,
            suggestion_generator,
            insight_generator,
            sessions: SessionRegistry::new(),
        }
    }
}
