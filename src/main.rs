//! Service entry point: config, pool, cache warmer, router.

use anyhow::Result;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cuotas_web::{cache, config::AppConfig, db, dues, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cuotas_web=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::connect(&config.database_url).await?;
    let state = AppState {
        db: pool.clone(),
        cache: cache::AppCache::new(),
    };

    tokio::spawn(cache::start_cache_warmer(state.cache.clone(), pool));

    let app = axum::Router::new()
        .nest("/api/cuotas", dues::router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
