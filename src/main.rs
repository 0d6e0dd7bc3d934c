use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use track_recs::{
    config::Config,
    data,
    routes::{create_router, AppState},
    services::{
        providers::{EventsStoreClient, FeaturesStoreClient},
        OnlineAggregator, RecommendationService,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,track_recs=debug")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting");

    let offline = data::load_offline_store(
        config.personal_recs_path.as_deref().map(Path::new),
        config.default_recs_path.as_deref().map(Path::new),
    )
    .context("Failed to load offline recommendations")?;
    if let Err(e) = offline.validate() {
        tracing::warn!(error = %e, "Offline store incomplete, affected lookups will be empty");
    }

    let http_client = reqwest::Client::new();
    let events = EventsStoreClient::new(
        http_client.clone(),
        config.events_store_url.clone(),
        config.upstream_timeout(),
    );
    let features = FeaturesStoreClient::new(
        http_client,
        config.features_store_url.clone(),
        config.upstream_timeout(),
    );
    let online = OnlineAggregator::new(
        Arc::new(events),
        Arc::new(features),
        config.recent_events_limit,
        config.upstream_timeout(),
    );

    let state = Arc::new(AppState {
        recommendations: RecommendationService::new(Arc::new(offline), online, config.online_timeout()),
        default_k: config.default_k,
    });
    let app = create_router(state.clone());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.recommendations.stats();
    tracing::info!("Stopping");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
