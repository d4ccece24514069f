/// Redis read-through cache in front of a catalog provider
///
/// Search pages are cached for an hour, found records for a week. Misses from
/// the detail endpoint are not cached so a title that appears later is picked up.
use crate::{
    cache::{Cache, CacheKey},
    cached,
    error::AppResult,
    models::{CatalogId, CatalogRecord, CatalogSummary},
    services::providers::{CatalogDetailProvider, CatalogSearchProvider},
};

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const TITLE_CACHE_TTL: u64 = 604800; // 1 week

pub struct CachedCatalog<P> {
    inner: P,
    cache: Cache,
}

impl<P> CachedCatalog<P> {
    pub fn new(inner: P, cache: Cache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait::async_trait]
impl<P> CatalogSearchProvider for CachedCatalog<P>
where
    P: CatalogSearchProvider,
{
    async fn search(&self, query: &str, page: u32) -> AppResult<Vec<CatalogSummary>> {
        let key = CacheKey::Search {
            query: query.to_string(),
            page,
        };

        cached!(self.cache, key, SEARCH_CACHE_TTL, async move {
            self.inner.search(query, page).await
        })
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[async_trait::async_trait]
impl<P> CatalogDetailProvider for CachedCatalog<P>
where
    P: CatalogDetailProvider,
{
    async fn fetch_details(&self, id: &CatalogId) -> AppResult<Option<CatalogRecord>> {
        let key = CacheKey::Title(id.clone());

        match self.cache.get_from_cache::<CatalogRecord>(&key).await {
            Ok(Some(record)) => {
                tracing::debug!(title_id = %id, "Cache hit");
                return Ok(Some(record));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, title_id = %id, "Cache read failed, using provider");
            }
        }

        let record = self.inner.fetch_details(id).await?;
        if let Some(record) = &record {
            self.cache.set_in_background(&key, record, TITLE_CACHE_TTL);
        }

        Ok(record)
    }
}
