use std::time::{Duration, Instant};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::DatabaseConfig;

fn pool_options(cfg: &DatabaseConfig) -> PgPoolOptions {
    // one attempt stays within the retry window
    let acquire = Duration::from_secs(cfg.connect_timeout_secs.max(1));
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .acquire_timeout(acquire)
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
}

/// Connects the pool, retrying once a second until `connect_timeout_secs` runs out.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let deadline = Instant::now() + Duration::from_secs(cfg.connect_timeout_secs);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let result = pool_options(cfg).connect(&cfg.url).await;
        match result {
            Ok(pool) => {
                info!(attempt, "connected to database");
                return Ok(pool);
            }
            Err(e) if Instant::now() < deadline => {
                warn!(attempt, error = %e, "database connection failed; retrying");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(e) => return Err(e).context("connect to database"),
        }
    }
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    info!("running database migrations");
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run database migrations")?;
    Ok(())
}
