//! Key-value cache client (Redis).
//!
//! The client is cheap to build and connects lazily; call [`RedisClient::ping`]
//! to find out at startup whether the server is reachable.

use std::ops::Deref;
use std::time::Duration;

use gobe_core::RedisConfig;
use redis::aio::{ConnectionManager, MultiplexedConnection};
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::DbError;

/// Redis client built from settings. Derefs to [`redis::Client`].
#[derive(Debug, Clone)]
pub struct RedisClient(redis::Client);

impl RedisClient {
    pub fn new(config: &RedisConfig) -> Result<Self, DbError> {
        let non_empty = |s: &Option<String>| s.clone().filter(|v| !v.is_empty());
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(config.host.clone(), config.port()),
            redis: RedisConnectionInfo {
                db: config.db,
                username: non_empty(&config.username),
                password: non_empty(&config.password),
                ..Default::default()
            },
        };
        let client = redis::Client::open(info)?;
        tracing::debug!(address = %config.address(), db = config.db, "Redis client created");
        Ok(Self(client))
    }

    /// Shared connection; clone it freely across tasks.
    pub async fn connection(&self) -> Result<MultiplexedConnection, DbError> {
        Ok(self.0.get_multiplexed_async_connection().await?)
    }

    /// Connection that reconnects on its own after failures.
    pub async fn connection_manager(&self) -> Result<ConnectionManager, DbError> {
        Ok(self.0.get_connection_manager().await?)
    }

    pub async fn ping(&self) -> Result<(), DbError> {
        let mut conn = self.connection().await?;
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    /// Read a JSON value; `None` when the key is absent.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DbError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(key).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Store a value as JSON, optionally expiring after `ttl` (whole seconds, minimum 1).
    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), DbError> {
        let payload = serde_json::to_string(value)?;
        let mut conn = self.connection().await?;
        match ttl {
            Some(ttl) => {
                conn.set_ex::<_, _, ()>(key, payload, ttl.as_secs().max(1))
                    .await?
            }
            None => conn.set::<_, _, ()>(key, payload).await?,
        }
        Ok(())
    }

    /// Remove a key. Returns whether it existed.
    pub async fn delete(&self, key: &str) -> Result<bool, DbError> {
        let mut conn = self.connection().await?;
        let removed: u64 = conn.del(key).await?;
        Ok(removed > 0)
    }
}

impl Deref for RedisClient {
    type Target = redis::Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(port: u16) -> RedisConfig {
        RedisConfig {
            host: "127.0.0.1".into(),
            port: Some(port),
            username: Some(String::new()),
            password: Some("pw".into()),
            db: 3,
        }
    }

    #[test]
    fn builds_connection_info_from_settings() {
        let client = RedisClient::new(&config(6380)).unwrap();
        let info = client.get_connection_info();
        assert_eq!(info.addr, ConnectionAddr::Tcp("127.0.0.1".into(), 6380));
        assert_eq!(info.redis.db, 3);
        assert_eq!(info.redis.username, None);
        assert_eq!(info.redis.password.as_deref(), Some("pw"));
    }

    #[tokio::test]
    async fn ping_unreachable_server_fails() {
        let client = RedisClient::new(&config(1)).unwrap();
        assert!(matches!(client.ping().await, Err(DbError::Redis(_))));
    }

    #[tokio::test]
    #[ignore = "requires redis"]
    async fn json_round_trip_with_ttl() {
        let client = RedisClient::new(&RedisConfig {
            password: None,
            db: 0,
            ..config(6379)
        })
        .unwrap();
        client
            .set_json("gobe:test", &vec![1, 2, 3], Some(Duration::from_secs(5)))
            .await
            .unwrap();
        let value: Option<Vec<i32>> = client.get_json("gobe:test").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
        assert!(client.delete("gobe:test").await.unwrap());
    }
}
