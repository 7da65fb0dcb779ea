use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::OnceCell;
use tracing::info;

use super::engine::EngineError;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Lazily-initialized process-wide connection pool over `DATABASE_URL`.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn pool() -> Result<PgPool, EngineError> {
        let pool = POOL
            .get_or_try_init(|| async {
                let url = std::env::var("DATABASE_URL")
                    .map_err(|_| EngineError::ConfigMissing("DATABASE_URL"))?;
                let db = crate::config::config().database.clone();
                let pool = PgPoolOptions::new()
                    .max_connections(db.max_connections)
                    .acquire_timeout(Duration::from_secs(db.connection_timeout_secs))
                    .connect(&url)
                    .await?;
                info!("created database pool ({} max connections)", db.max_connections);
                Ok::<_, EngineError>(pool)
            })
            .await?;
        Ok(pool.clone())
    }
}
