/// Read-through caching around a provider call.
///
/// Looks the key up first and returns the cached value on a hit. On a miss,
/// or when the cache itself cannot be read, awaits `$block`, queues the
/// result for a background write and returns it. Cache failures never fail
/// the call; errors from `$block` propagate with `?`.
///
/// # Arguments
/// * `$cache`: a [`Cache`](crate::cache::Cache) (needs `get_from_cache` and `set_in_background`).
/// * `$key`: the [`CacheKey`](crate::cache::CacheKey) to read and write.
/// * `$ttl`: time-to-live for the stored value, in seconds.
/// * `$block`: future computing the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let hits = cached!(self.cache, key, SEARCH_CACHE_TTL, async move {
///     self.inner.search(query, page).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = &$key;
        match $cache.get_from_cache(key).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(cached)
            }
            lookup => {
                if let Err(e) = lookup {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, using provider");
                }
                let value = $block.await?;
                $cache.set_in_background(key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
