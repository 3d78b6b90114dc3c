//! The seam between the request/response core and whatever performs I/O.
//!
//! The core never opens a socket. Signing, retries and connection handling
//! belong to the `Transport` implementation, which may read credentials from
//! `BccClient::credentials()`.

use tracing::debug;

use crate::client::{BccClient, REQUEST_ID_HEADER};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
///
/// Any non-2xx status must be returned as an `HttpResponse`, not an error;
/// `ApiError::Transport` is reserved for failures where no response exists.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, ApiError>,
{
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self(request)
    }
}

impl BccClient {
    /// Send a built request through `transport`.
    pub fn send<T: Transport + ?Sized>(&self, transport: &T, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let response = transport.send(request)?;
        debug!(
            method = request.method.as_str(),
            path = %request.path,
            status = response.status,
            request_id = response.header(REQUEST_ID_HEADER).unwrap_or("-"),
            "round-trip complete"
        );
        Ok(response)
    }
}
