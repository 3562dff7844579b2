use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinefeed_api::{
    api::{create_router, AppState},
    config::Config,
    db::PreferenceStore,
    services::providers::{
        MetadataProvider, RecommendationProvider, RecommenderClient, TmdbProvider,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinefeed_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let metadata: Arc<dyn MetadataProvider> = Arc::new(TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));
    let recommender: Arc<dyn RecommendationProvider> =
        Arc::new(RecommenderClient::new(config.recommender_url.clone()));

    let preferences = PreferenceStore::open(&config.preferences_path)
        .await
        .context("Failed to open preference store")?;

    let state = AppState::new(metadata, recommender, preferences);

    // Returning users skip onboarding and get their feed right away
    if let Some(prefs) = state.preferences.current().await {
        if let Err(e) = state.on_preferences_available(&prefs).await {
            tracing::warn!(error = %e, "Initial feed fetch failed");
        }
    }

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
