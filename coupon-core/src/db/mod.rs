// coupon-core/src/db/mod.rs

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::Error;

/// Connection settings for the shared pool.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    /// How long a claim may wait for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl DatabaseSettings {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Postgres pool shared by every repository and the allocation store.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Postgres>,
}

impl Database {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, Error> {
        if settings.max_connections == 0 {
            return Err(Error::Config("max_connections must be > 0".to_string()));
        }

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect(&settings.url)
            .await?;

        info!(
            "Postgres pool ready (max_connections={}, acquire_timeout={:?})",
            settings.max_connections, settings.acquire_timeout
        );
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema from `migrations/`.
    pub async fn migrate(&self) -> Result<(), Error> {
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Coupon schema is up to date.");
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Postgres pool closed.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_connections_is_a_config_error() {
        let settings = DatabaseSettings::new("postgres://unused", 0);
        assert!(matches!(
            Database::connect(&settings).await,
            Err(Error::Config(_))
        ));
    }
}
