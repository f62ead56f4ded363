//! Handler error type rendered as a FAILED envelope.

use axum::response::{IntoResponse, Response};
use gobe_db::DbError;

use crate::response;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 with the message
    #[error("bad request: {0}")]
    BadRequest(String),

    /// 401
    #[error("unauthorized")]
    Unauthorized,

    /// 403 with the reason
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 500, logged, message not exposed
    #[error("internal error: {0}")]
    Internal(String),

    /// 400 for rejected input, otherwise 500
    #[error(transparent)]
    Db(#[from] DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => response::bad_request_with_message(message),
            Self::Unauthorized => response::unauthorized(),
            Self::Forbidden(reason) => response::forbidden_with_message(reason),
            Self::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                response::internal_server_error()
            }
            Self::Db(e) if e.is_client_error() => response::bad_request_with_message(e.to_string()),
            Self::Db(e) => {
                // Log the actual error, return the bare envelope
                tracing::error!("Database error: {}", e);
                response::internal_server_error()
            }
        }
    }
}
