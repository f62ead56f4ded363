//! Success/failure envelopes.
//!
//! Every response body has the same shape:
//!
//! ```json
//! {"status": "SUCCESS"}
//! {"status": "FAILED", "message": "email is required"}
//! ```
//!
//! `message` is any serializable value and is omitted when absent.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Success,
    Failed,
}

/// Fixed-shape JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<M = serde_json::Value> {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<M>,
}

impl Envelope {
    pub fn success() -> Self {
        Self {
            status: Status::Success,
            message: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            status: Status::Failed,
            message: None,
        }
    }
}

impl<M> Envelope<M> {
    pub fn with_message<N>(self, message: N) -> Envelope<N> {
        Envelope {
            status: self.status,
            message: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

fn respond<M: Serialize>(status: StatusCode, envelope: Envelope<M>) -> Response {
    (status, Json(envelope)).into_response()
}

// ==SUCCESS RESPONSES (2xx)==

/// 200 `{"status":"SUCCESS"}`
pub fn success() -> Response {
    respond(StatusCode::OK, Envelope::success())
}

/// 200 with a message or payload.
pub fn success_with_message<M: Serialize>(message: M) -> Response {
    respond(StatusCode::OK, Envelope::success().with_message(message))
}

// ==CLIENT ERROR RESPONSES (4xx)==

/// 400 `{"status":"FAILED"}`
pub fn bad_request() -> Response {
    respond(StatusCode::BAD_REQUEST, Envelope::failed())
}

pub fn bad_request_with_message<M: Serialize>(message: M) -> Response {
    respond(StatusCode::BAD_REQUEST, Envelope::failed().with_message(message))
}

/// 401 `{"status":"FAILED"}`
pub fn unauthorized() -> Response {
    respond(StatusCode::UNAUTHORIZED, Envelope::failed())
}

pub fn unauthorized_with_message<M: Serialize>(message: M) -> Response {
    respond(StatusCode::UNAUTHORIZED, Envelope::failed().with_message(message))
}

/// 403 `{"status":"FAILED"}`
pub fn forbidden() -> Response {
    respond(StatusCode::FORBIDDEN, Envelope::failed())
}

pub fn forbidden_with_message<M: Serialize>(message: M) -> Response {
    respond(StatusCode::FORBIDDEN, Envelope::failed().with_message(message))
}

// ==SERVER ERROR RESPONSES (5xx)==

/// 500 `{"status":"FAILED"}`
pub fn internal_server_error() -> Response {
    respond(StatusCode::INTERNAL_SERVER_ERROR, Envelope::failed())
}

pub fn internal_server_error_with_message<M: Serialize>(message: M) -> Response {
    respond(
        StatusCode::INTERNAL_SERVER_ERROR,
        Envelope::failed().with_message(message),
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    pub(crate) async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn success_has_only_status() {
        let response = success();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "SUCCESS"}));
    }

    #[tokio::test]
    async fn success_with_structured_message() {
        let response = success_with_message(json!({"id": 7}));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"status": "SUCCESS", "message": {"id": 7}})
        );
    }

    #[tokio::test]
    async fn failures_use_their_status_codes() {
        let cases = [
            (bad_request(), StatusCode::BAD_REQUEST),
            (unauthorized(), StatusCode::UNAUTHORIZED),
            (forbidden(), StatusCode::FORBIDDEN),
            (internal_server_error(), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (response, expected) in cases {
            assert_eq!(response.status(), expected);
            assert_eq!(body_json(response).await, json!({"status": "FAILED"}));
        }
    }

    #[tokio::test]
    async fn failures_carry_messages() {
        let cases = [
            (bad_request_with_message("bad"), StatusCode::BAD_REQUEST),
            (unauthorized_with_message("bad"), StatusCode::UNAUTHORIZED),
            (forbidden_with_message("bad"), StatusCode::FORBIDDEN),
            (
                internal_server_error_with_message("bad"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (response, expected) in cases {
            assert_eq!(response.status(), expected);
            assert_eq!(
                body_json(response).await,
                json!({"status": "FAILED", "message": "bad"})
            );
        }
    }

    #[test]
    fn envelope_parses_without_message() {
        let env: Envelope = serde_json::from_str(r#"{"status":"SUCCESS"}"#).unwrap();
        assert!(env.is_success());
        assert!(env.message.is_none());
    }
}
