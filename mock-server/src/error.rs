use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{request_id, REQUEST_ID_HEADER};

/// BCE-style error: `{code, message, requestId}` plus the request id header.
#[derive(Debug)]
pub struct BceError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl BceError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "InvalidParameter", message)
    }

    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "MalformedJSON", message)
    }

    pub fn not_found(kind: &str, id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NoSuchObject", format!("{kind} {id} does not exist"))
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, code, message)
    }
}

impl IntoResponse for BceError {
    fn into_response(self) -> Response {
        let request_id = request_id();
        tracing::warn!(
            status = self.status.as_u16(),
            code = self.code,
            request_id = %request_id,
            "{}",
            self.message
        );
        let body = json!({
            "code": self.code,
            "message": self.message,
            "requestId": request_id,
        });
        (self.status, [(REQUEST_ID_HEADER, request_id)], Json(body)).into_response()
    }
}
