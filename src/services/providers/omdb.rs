/// OMDb API provider
///
/// One endpoint serves both operations:
/// 1. Title search: `/?s=<query>&page=<n>` returns up to ten summaries per page
/// 2. Details: `/?i=<imdb id>` returns the full record
///
/// A miss is reported in the body (`"Response": "False"`) with a 200 status, so
/// only non-success statuses and undecodable bodies count as errors.
use crate::{
    error::{AppError, AppResult},
    models::{CatalogId, CatalogRecord, CatalogSummary, OmdbSearchResponse, OmdbTitle},
    services::providers::{CatalogDetailProvider, CatalogSearchProvider},
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbProvider {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/", self.api_url.trim_end_matches('/'))
    }

    /// Issues one GET against the API and decodes the body
    async fn get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> AppResult<T> {
        let response = self
            .http_client
            .get(self.endpoint())
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDb API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        tracing::debug!(response = %response_text, "Raw OMDb API response");

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                response = %response_text,
                "Failed to deserialize OMDb response"
            );
            AppError::ExternalApi(format!("Failed to parse OMDb response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl CatalogSearchProvider for OmdbProvider {
    async fn search(&self, query: &str, page: u32) -> AppResult<Vec<CatalogSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let page = page.max(1).to_string();
        let response: OmdbSearchResponse =
            self.get(&[("s", query), ("page", page.as_str())]).await?;

        if let Some(error) = &response.error {
            tracing::debug!(query = %query, error = %error, "OMDb search returned no matches");
        }

        let titles = response.into_summaries();

        tracing::info!(
            query = %query,
            page = %page,
            results = titles.len(),
            provider = "omdb",
            "Title search completed"
        );

        Ok(titles)
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}

#[async_trait::async_trait]
impl CatalogDetailProvider for OmdbProvider {
    async fn fetch_details(&self, id: &CatalogId) -> AppResult<Option<CatalogRecord>> {
        let title: OmdbTitle = self.get(&[("i", id.as_str())]).await?;

        if let Some(error) = &title.error {
            tracing::debug!(title_id = %id, error = %error, "OMDb reported title not found");
        }

        let record = title.into_record();

        tracing::info!(
            title_id = %id,
            found = record.is_some(),
            provider = "omdb",
            "Title details fetched"
        );

        Ok(record)
    }
}
