use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_api::{
    cache::{create_redis_client, Cache, CacheWriterHandle},
    config::Config,
    routes::{create_router, AppState},
    services::providers::{
        cached::CachedCatalog, gemini::GeminiClient, omdb::OmdbProvider, CatalogDetailProvider,
        CatalogSearchProvider, InsightGenerator, SuggestionGenerator,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let omdb = OmdbProvider::new(
        http_client.clone(),
        config.omdb_api_key.clone(),
        config.omdb_api_url.clone(),
    );

    let mut cache_handle: Option<CacheWriterHandle> = None;
    let (search_provider, detail_provider): (
        Arc<dyn CatalogSearchProvider>,
        Arc<dyn CatalogDetailProvider>,
    ) = match config.redis_url.as_deref() {
        Some(redis_url) => {
            let (cache, handle) = Cache::new(create_redis_client(redis_url)?).await;
            cache_handle = Some(handle);
            tracing::info!("Catalog cache enabled");
            let catalog = Arc::new(CachedCatalog::new(omdb, cache));
            (
                catalog.clone() as Arc<dyn CatalogSearchProvider>,
                catalog as Arc<dyn CatalogDetailProvider>,
            )
        }
        None => {
            tracing::info!("REDIS_URL not set, catalog cache disabled");
            let catalog = Arc::new(omdb);
            (
                catalog.clone() as Arc<dyn CatalogSearchProvider>,
                catalog as Arc<dyn CatalogDetailProvider>,
            )
        }
    };

    let gemini = Arc::new(GeminiClient::new(
        http_client,
        config.gemini_api_key.clone(),
        config.gemini_api_url.clone(),
        config.gemini_model.clone(),
    ));
    if !gemini.is_configured() {
        tracing::warn!("GEMINI_API_KEY not set, AI suggestions and insights disabled");
    }

    let state = Arc::new(AppState::new(
        search_provider,
        detail_provider,
        gemini.clone() as Arc<dyn SuggestionGenerator>,
        gemini as Arc<dyn InsightGenerator>,
    ));

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server running on http://{}", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
