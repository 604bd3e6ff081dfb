//! In-memory caching using moka
//!
//! Holds the dues engine's reference data: the 7-row period catalog. The
//! catalog is immutable in practice, so a generous TTL is used and a
//! background warmer keeps it populated.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::dues::models::Periodo;
use crate::dues::queries;
use crate::error::Result;

const PERIODOS_KEY: &str = "periodos";

/// Application cache holding the period catalog
#[derive(Clone)]
pub struct AppCache {
    /// Period catalog (single entry under PERIODOS_KEY)
    periodos: Cache<&'static str, Arc<Vec<Periodo>>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // one entry, 1 hour TTL; the warmer refreshes it anyway
            periodos: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(60 * 60))
                .build(),
        }
    }

    /// Period catalog, loading through the cache on miss.
    pub async fn periodos(&self, pool: &PgPool) -> Result<Arc<Vec<Periodo>>> {
        if let Some(cached) = self.periodos.get(PERIODOS_KEY).await {
            return Ok(cached);
        }
        let rows = Arc::new(queries::get_periodos(pool).await?);
        self.periodos.insert(PERIODOS_KEY, rows.clone()).await;
        Ok(rows)
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            periodos_cached: self.periodos.entry_count() > 0,
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.periodos.invalidate_all();
        info!("All caches invalidated");
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub periodos_cached: bool,
}

/// Start background cache warmer
///
/// Warms the period catalog on startup and refreshes it hourly.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool) {
    warm_cache(&cache, &db).await;

    let mut interval = interval(Duration::from_secs(60 * 60));
    loop {
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

async fn warm_cache(cache: &AppCache, db: &PgPool) {
    match queries::get_periodos(db).await {
        Ok(rows) => {
            cache.periodos.insert(PERIODOS_KEY, Arc::new(rows)).await;
            info!("Cache warm-up complete. Stats: {:?}", cache.stats());
        }
        Err(e) => warn!("Failed to warm period catalog: {}", e),
    }
}
