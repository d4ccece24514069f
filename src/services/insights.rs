use std::sync::Arc;

use crate::{
    error::AppResult,
    models::TitleInsights,
    services::{
        providers::{CatalogDetailProvider, InsightGenerator},
        title_search::get_title,
    },
};

/// Storyline and age rating for a title's detail page
///
/// Both generator calls run concurrently; either may come back empty.
pub async fn get_insights(
    details: Arc<dyn CatalogDetailProvider>,
    generator: Arc<dyn InsightGenerator>,
    id: &str,
) -> AppResult<TitleInsights> {
    let record = get_title(details, id).await?;

    let (storyline, age_rating) = tokio::join!(
        generator.storyline(&record.title),
        generator.age_rating(&record.title)
    );

    tracing::info!(
        title_id = %record.id,
        storyline = storyline.is_some(),
        age_rating = ?age_rating,
        "Insights generated"
    );

    Ok(TitleInsights {
        storyline,
        age_rating,
    })
}
