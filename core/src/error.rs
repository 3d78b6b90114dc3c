//! Error types for the BCC client core.
//!
//! # Design
//! Each variant maps to one failure source: caller input rejected before any
//! request is built, the transport, the provider answering with a non-2xx
//! status, a 2xx body that does not match the expected shape, and a polling
//! deadline. `request_id` is carried wherever the provider supplied one so
//! callers can correlate with provider-side logs.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by `BccClient` build/parse methods and the lifecycle helpers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client-side validation failed. No request was built.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The transport could not complete the round-trip.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-2xx status.
    #[error("provider error (HTTP {status}, code {}, request id {}): {message}",
        .code.as_deref().unwrap_or("-"),
        .request_id.as_deref().unwrap_or("-"))]
    Provider {
        status: u16,
        code: Option<String>,
        message: String,
        request_id: Option<String>,
    },

    /// A 2xx body did not match the operation's expected shape.
    #[error("malformed response: {reason}")]
    MalformedResponse {
        reason: String,
        request_id: Option<String>,
    },

    /// A polling helper exceeded its deadline.
    #[error("timed out after {waited:?} waiting for {resource} {id} (last status: {})",
        .last_status.as_deref().unwrap_or("unknown"))]
    Timeout {
        resource: &'static str,
        id: String,
        last_status: Option<String>,
        waited: Duration,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Client configuration could not be loaded or is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ApiError::InvalidArgument(msg.into())
    }

    /// Provider request id, when one was returned.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            ApiError::Provider { request_id, .. } | ApiError::MalformedResponse { request_id, .. } => {
                request_id.as_deref()
            }
            _ => None,
        }
    }

    /// Provider error code such as `InvalidParameter`.
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Provider { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// The provider answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Provider { status: 404, .. })
    }

    /// The provider rejected the request (4xx) or it never left the client.
    pub fn is_client_error(&self) -> bool {
        match self {
            ApiError::Provider { status, .. } => (400..500).contains(status),
            ApiError::InvalidArgument(_) => true,
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout { .. })
    }
}
