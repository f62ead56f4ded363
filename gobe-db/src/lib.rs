//! gobe-db: connectors and a generic repository.
//!
//! - [`sql::SqlConnector`]: sqlx pool for PostgreSQL or MySQL
//! - [`orm::OrmConnector`]: sea-orm connection with optional auto-migration
//! - [`mongo::MongoConnector`]: MongoDB database handle
//! - [`cache::RedisClient`]: Redis client with JSON helpers
//! - [`repository::Repository`]: CRUD helpers over any sea-orm entity

pub mod cache;
pub mod error;
pub mod health;
pub mod mongo;
pub mod orm;
pub mod pagination;
pub mod repository;
pub mod sql;

#[cfg(test)]
mod fixtures;

pub use cache::RedisClient;
pub use error::{DbError, DbResult};
pub use health::{ping_all, Ping};
pub use mongo::MongoConnector;
pub use orm::{auto_migrate, OrmConnector, Table};
pub use pagination::{Paginated, Pagination};
pub use repository::{Direction, Filter, OrderBy, Repository, WithNested, WithRelated};
pub use sql::{SqlConnector, SqlPool};
