use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_pool: PgPool,
}

impl AppState {
    /// The pool is lazy: the server comes up even if Postgres is still
    /// starting, and the first query pays the connection cost.
    pub fn build(config: AppConfig) -> Result<Self, sqlx::Error> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_pool_max_connections)
            .min_connections(config.db_pool_min_connections)
            .acquire_timeout(Duration::from_secs(config.db_pool_acquire_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.db_pool_idle_timeout_seconds))
            .connect_lazy(&config.database_url)?;

        Ok(Self {
            config: Arc::new(config),
            db_pool,
        })
    }
}
