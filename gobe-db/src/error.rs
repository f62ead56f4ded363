//! Error type for every connector and the repository.
//!
//! Driver errors pass through untouched; the remaining variants describe
//! input the repository refused to forward to the database.

use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("orm error: {0}")]
    Orm(#[from] sea_orm::DbErr),

    #[error("mongo error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not found: {resource} matching {filter}")]
    NotFound { resource: String, filter: String },

    #[error("unknown column '{column}' on '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("invalid value for column '{column}': {reason}")]
    InvalidValue { column: String, reason: String },

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("invalid order clause: {0}")]
    InvalidOrder(String),
}

impl DbError {
    /// True when the caller sent bad input rather than the backend failing.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::UnknownColumn { .. }
                | Self::InvalidValue { .. }
                | Self::InvalidFilter(_)
                | Self::InvalidOrder(_)
        )
    }
}
