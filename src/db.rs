//! Database pool setup

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connect to Postgres with sensible pool limits for a small service.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}
