//! Dues engine service for the association member system.
//!
//! Rust/Axum front end over the legacy Postgres schema: computes member
//! dues, historical prices and revenue aggregates for the administration
//! UI. Rendering (receipts, exports) stays in the legacy system; this
//! service is JSON only.

pub mod cache;
pub mod config;
pub mod db;
pub mod dues;
pub mod error;

use sqlx::PgPool;

use cache::AppCache;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
}
