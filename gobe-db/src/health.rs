//! Reachability checks across connectors.

use async_trait::async_trait;

use crate::cache::RedisClient;
use crate::error::DbError;
use crate::mongo::MongoConnector;
use crate::orm::OrmConnector;
use crate::sql::SqlConnector;

/// A backend that can be asked whether it is alive.
#[async_trait]
pub trait Ping: Send + Sync {
    fn name(&self) -> &'static str;

    async fn ping(&self) -> Result<(), DbError>;
}

#[async_trait]
impl Ping for SqlConnector {
    fn name(&self) -> &'static str {
        "sql"
    }

    async fn ping(&self) -> Result<(), DbError> {
        SqlConnector::ping(self).await
    }
}

#[async_trait]
impl Ping for OrmConnector {
    fn name(&self) -> &'static str {
        "orm"
    }

    async fn ping(&self) -> Result<(), DbError> {
        OrmConnector::ping(self).await
    }
}

#[async_trait]
impl Ping for MongoConnector {
    fn name(&self) -> &'static str {
        "mongo"
    }

    async fn ping(&self) -> Result<(), DbError> {
        MongoConnector::ping(self).await
    }
}

#[async_trait]
impl Ping for RedisClient {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> Result<(), DbError> {
        RedisClient::ping(self).await
    }
}

/// Ping every target in order, logging each outcome.
pub async fn ping_all(targets: &[&dyn Ping]) -> Vec<(&'static str, Result<(), DbError>)> {
    let mut results = Vec::with_capacity(targets.len());
    for target in targets {
        let result = target.ping().await;
        match &result {
            Ok(()) => tracing::info!(backend = target.name(), "reachable"),
            Err(e) => tracing::error!(backend = target.name(), error = %e, "unreachable"),
        }
        results.push((target.name(), result));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake {
        name: &'static str,
        up: bool,
    }

    #[async_trait]
    impl Ping for Fake {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn ping(&self) -> Result<(), DbError> {
            if self.up {
                Ok(())
            } else {
                Err(DbError::Orm(sea_orm::DbErr::Custom("down".into())))
            }
        }
    }

    #[tokio::test]
    async fn ping_all_reports_each_backend() {
        let up = Fake { name: "a", up: true };
        let down = Fake { name: "b", up: false };
        let results = ping_all(&[&up, &down]).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "a");
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, "b");
        assert!(results[1].1.is_err());
    }
}
