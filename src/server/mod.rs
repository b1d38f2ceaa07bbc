use crate::cache::{Cache, MemoryCache};
use crate::config::Config;
use crate::metadata::enrich::{Enricher, EnricherSettings};
use crate::metadata::genres::GenreResolver;
use crate::metadata::provider::{PrimaryProvider, SecondaryProvider};
use crate::metadata::providers::{OmdbProvider, TmdbProvider};
use crate::search::orchestrator::{OrchestratorSettings, SearchOrchestrator};
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod routes_search;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub orchestrator: Arc<SearchOrchestrator>,
    pub config: Arc<Config>,
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .route("/movies/search", get(routes_search::search))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Wire up the full search stack from configuration.
pub fn build_context(config: Config) -> AppContext {
    let primary: Arc<dyn PrimaryProvider> =
        Arc::new(TmdbProvider::new(&config.providers.tmdb));
    let secondary: Arc<dyn SecondaryProvider> =
        Arc::new(OmdbProvider::new(&config.providers.omdb));
    build_context_with_providers(config, primary, secondary)
}

/// Wire up the search stack around caller-supplied providers. The seam the
/// API tests use to swap in stubs.
pub fn build_context_with_providers(
    config: Config,
    primary: Arc<dyn PrimaryProvider>,
    secondary: Arc<dyn SecondaryProvider>,
) -> AppContext {
    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new(config.cache.max_entries));

    let genres = Arc::new(GenreResolver::new(
        primary.clone(),
        cache.clone(),
        Duration::from_secs(config.cache.genres_ttl_secs),
    ));

    let enricher = Arc::new(Enricher::new(
        primary.clone(),
        secondary,
        cache.clone(),
        genres.clone(),
        EnricherSettings {
            credits_ttl: Duration::from_secs(config.cache.credits_ttl_secs),
            secondary_ttl: Duration::from_secs(config.cache.secondary_ttl_secs),
            sub_fetch_timeout: Duration::from_secs(config.search.sub_fetch_timeout_secs),
        },
    ));

    let orchestrator = Arc::new(SearchOrchestrator::new(
        primary,
        enricher,
        genres,
        cache,
        OrchestratorSettings {
            search_ttl: Duration::from_secs(config.cache.search_ttl_secs),
            popular_ttl: Duration::from_secs(config.cache.popular_ttl_secs),
            max_concurrent_enrichments: config.search.max_concurrent_enrichments,
            popular_page_size: config.search.popular_page_size,
        },
    ));

    AppContext {
        orchestrator,
        config: Arc::new(config),
    }
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = build_context(config);
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
