//! Plain driver connector.
//!
//! Uses sqlx pools with explicit connection limits, for callers that write
//! their own SQL and do not need the ORM.

use std::time::Duration;

use gobe_core::{DbDriver, SqlConfig};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::{MySqlPool, PgPool};

use crate::error::DbError;

/// Pool for whichever driver the settings chose.
#[derive(Debug, Clone)]
pub enum SqlPool {
    Postgres(PgPool),
    MySql(MySqlPool),
}

impl SqlPool {
    pub fn driver(&self) -> DbDriver {
        match self {
            Self::Postgres(_) => DbDriver::Postgres,
            Self::MySql(_) => DbDriver::Mysql,
        }
    }
}

/// An open driver pool plus the DSN it was opened with.
#[derive(Clone)]
pub struct SqlConnector {
    pub data_source_name: String,
    pub pool: SqlPool,
}

impl SqlConnector {
    /// Open a pool for the configured driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the first connection cannot be established.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let settings = Settings::load("settings.yaml")?;
    /// let sql = SqlConnector::connect(settings.sql.as_ref().unwrap()).await?;
    /// ```
    pub async fn connect(config: &SqlConfig) -> Result<Self, DbError> {
        let dsn = config.data_source_name();
        let timeout = Duration::from_secs(config.connect_timeout_secs);
        let driver = config.driver.as_str();

        let pool = match config.driver {
            DbDriver::Postgres => SqlPool::Postgres(
                PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(timeout)
                    .connect(&dsn)
                    .await
                    .inspect_err(|e| {
                        tracing::error!(driver, error = %e, "Failed to open SQL connection")
                    })?,
            ),
            DbDriver::Mysql => SqlPool::MySql(
                MySqlPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(timeout)
                    .connect(&dsn)
                    .await
                    .inspect_err(|e| {
                        tracing::error!(driver, error = %e, "Failed to open SQL connection")
                    })?,
            ),
        };

        tracing::info!(
            driver,
            host = %config.db_host,
            database = %config.db_name,
            max_connections = config.max_connections,
            "SQL pool ready"
        );
        Ok(Self {
            data_source_name: dsn,
            pool,
        })
    }

    pub fn as_postgres(&self) -> Option<&PgPool> {
        match &self.pool {
            SqlPool::Postgres(pool) => Some(pool),
            SqlPool::MySql(_) => None,
        }
    }

    pub fn as_mysql(&self) -> Option<&MySqlPool> {
        match &self.pool {
            SqlPool::MySql(pool) => Some(pool),
            SqlPool::Postgres(_) => None,
        }
    }

    /// Round-trip `SELECT 1`.
    pub async fn ping(&self) -> Result<(), DbError> {
        match &self.pool {
            SqlPool::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            SqlPool::MySql(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
        }
        Ok(())
    }

    pub async fn close(&self) {
        match &self.pool {
            SqlPool::Postgres(pool) => pool.close().await,
            SqlPool::MySql(pool) => pool.close().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gobe_core::{Connector, OrmOptions};

    fn unreachable_config(driver: DbDriver) -> SqlConfig {
        SqlConfig {
            driver,
            connector: Connector::Sql,
            db_name: "app".into(),
            db_host: "127.0.0.1".into(),
            // Port 1 is reserved and refuses connections
            db_port: Some(1),
            db_username: "app".into(),
            db_password: "app".into(),
            ssl_mode: "disable".into(),
            data_source_name: None,
            orm: OrmOptions::default(),
            max_connections: 1,
            connect_timeout_secs: 2,
        }
    }

    #[tokio::test]
    async fn connect_failure_is_returned() {
        assert!(SqlConnector::connect(&unreachable_config(DbDriver::Postgres)).await.is_err());
        assert!(SqlConnector::connect(&unreachable_config(DbDriver::Mysql)).await.is_err());
    }

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p gobe-db -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_answers_ping() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let config = SqlConfig {
            data_source_name: Some(url),
            ..unreachable_config(DbDriver::Postgres)
        };
        let sql = SqlConnector::connect(&config).await.expect("pool creation failed");
        sql.ping().await.expect("ping failed");
        assert!(sql.as_postgres().is_some());
        assert!(sql.as_mysql().is_none());
        sql.close().await;
    }
}
