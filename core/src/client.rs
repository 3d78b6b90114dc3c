//! Stateless HTTP request builder and response decoder for the BCC API.
//!
//! # Design
//! `BccClient` holds only its immutable configuration and carries no mutable
//! state between calls. Every operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`; those live in the per-resource modules under `api`. This
//! module owns the shared pieces: path and query assembly, body encoding,
//! input validation and status/body decoding.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::ClientToken;

/// Version prefix shared by every BCC resource path.
pub const API_VERSION_PREFIX: &str = "/v2";

/// Response header carrying the provider request id.
pub const REQUEST_ID_HEADER: &str = "x-bce-request-id";

const CONTENT_TYPE_JSON: &str = "application/json";

/// Synchronous, stateless client for the BCC API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller (or a `Transport`) executes the
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct BccClient {
    config: ClientConfig,
    base_url: String,
}

impl BccClient {
    /// Validates the configuration and binds the client to its endpoint.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let base_url = config.base_url();
        Ok(Self { config, base_url })
    }

    /// Shorthand for `BccClient::new(ClientConfig::new(..))`.
    pub fn with_credentials(access_key: &str, secret_key: &str, endpoint: &str) -> Result<Self, ApiError> {
        Self::new(ClientConfig::new(access_key, secret_key, endpoint))
    }

    /// Credentials for transports that sign requests.
    pub fn credentials(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a request against `/v2/<segments...>`. Segments are percent-encoded.
    pub(crate) fn request(&self, method: HttpMethod, segments: &[&str]) -> RequestBuilder {
        let mut path = format!("{}{API_VERSION_PREFIX}", self.base_url);
        for segment in segments {
            path.push('/');
            path.push_str(&urlencoding::encode(segment));
        }
        RequestBuilder {
            method,
            path,
            query: Vec::new(),
            body: None,
        }
    }
}

/// Incremental builder for one `HttpRequest`.
pub(crate) struct RequestBuilder {
    method: HttpMethod,
    path: String,
    query: Vec<(String, Option<String>)>,
    body: Option<String>,
}

impl RequestBuilder {
    /// Bare action key, e.g. `?resize`.
    pub(crate) fn action(mut self, action: &str) -> Self {
        self.query.push((action.to_string(), None));
        self
    }

    pub(crate) fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), Some(value.to_string())));
        self
    }

    pub(crate) fn param_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Idempotency token, threaded through unchanged.
    pub(crate) fn client_token(self, token: Option<&ClientToken>) -> Self {
        self.param_opt("clientToken", token.map(ClientToken::as_str))
    }

    pub(crate) fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    pub(crate) fn build(self) -> HttpRequest {
        let headers = if self.body.is_some() {
            vec![("content-type".to_string(), CONTENT_TYPE_JSON.to_string())]
        } else {
            Vec::new()
        };
        let request = HttpRequest {
            method: self.method,
            path: self.path,
            query: self.query,
            headers,
            body: self.body,
        };
        debug!(method = request.method.as_str(), url = %request.url(), "built request");
        request
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub(crate) fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn require_opt(field: &str, value: Option<&str>) -> Result<(), ApiError> {
    match value {
        Some(value) => require(field, value),
        None => Ok(()),
    }
}

pub(crate) fn require_positive(field: &str, value: u32) -> Result<(), ApiError> {
    if value == 0 {
        return Err(ApiError::invalid(format!("{field} must be greater than zero")));
    }
    Ok(())
}

pub(crate) fn require_positive_opt(field: &str, value: Option<u32>) -> Result<(), ApiError> {
    match value {
        Some(value) => require_positive(field, value),
        None => Ok(()),
    }
}

pub(crate) fn require_items<T>(field: &str, items: &[T]) -> Result<(), ApiError> {
    if items.is_empty() {
        return Err(ApiError::invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn header_request_id(response: &HttpResponse) -> Option<String> {
    response.header(REQUEST_ID_HEADER).map(str::to_string)
}

/// Map non-2xx status codes to `ApiError::Provider`.
///
/// Each body field is read on its own, so a mistyped `code` does not hide a
/// good `requestId`. The request id falls back to the `x-bce-request-id`
/// header when the body does not carry one.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let parsed: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);
    let field = |name: &str| parsed.get(name).and_then(Value::as_str).map(str::to_string);
    let code = field("code");
    let request_id = field("requestId").or_else(|| header_request_id(response));
    let message = field("message").unwrap_or_else(|| {
        let raw = response.body.trim();
        if raw.is_empty() {
            format!("HTTP {}", response.status)
        } else {
            raw.to_string()
        }
    });
    warn!(
        status = response.status,
        code = code.as_deref().unwrap_or("-"),
        request_id = request_id.as_deref().unwrap_or("-"),
        "provider returned an error"
    );
    Err(ApiError::Provider {
        status: response.status,
        code,
        message,
        request_id,
    })
}

pub(crate) fn malformed(response: &HttpResponse, reason: impl Into<String>) -> ApiError {
    ApiError::MalformedResponse {
        reason: reason.into(),
        request_id: header_request_id(response),
    }
}

/// Decode a 2xx JSON body into `T`. Required fields are enforced by `T`'s
/// serde derive; unknown fields are ignored.
pub(crate) fn decode_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    check_status(response)?;
    debug!(
        status = response.status,
        request_id = response.header(REQUEST_ID_HEADER).unwrap_or("-"),
        "decoding response"
    );
    if response.body.trim().is_empty() {
        return Err(malformed(response, "empty body"));
    }
    serde_json::from_str(&response.body).map_err(|e| malformed(response, e.to_string()))
}

/// Accept any 2xx response and ignore its body.
pub(crate) fn decode_empty(response: &HttpResponse) -> Result<(), ApiError> {
    check_status(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BccClient {
        BccClient::with_credentials("ak", "sk", "http://localhost:8080").unwrap()
    }

    #[test]
    fn new_rejects_missing_credentials() {
        let err = BccClient::with_credentials("", "sk", "localhost").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn request_path_joins_segments_under_version_prefix() {
        let req = client().request(HttpMethod::Get, &["instance", "i-1", "vnc"]).build();
        assert_eq!(req.path, "http://localhost:8080/v2/instance/i-1/vnc");
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn path_segments_are_encoded() {
        let req = client().request(HttpMethod::Get, &["instance", "a/b"]).build();
        assert_eq!(req.path, "http://localhost:8080/v2/instance/a%2Fb");
    }

    #[test]
    fn json_body_sets_content_type() {
        let req = client()
            .request(HttpMethod::Post, &["instance"])
            .json(&serde_json::json!({"name": "x"}))
            .unwrap()
            .build();
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        assert_eq!(req.json_body().unwrap()["name"], "x");
    }

    #[test]
    fn client_token_is_threaded_unchanged() {
        let token = ClientToken::new("token-123");
        let req = client()
            .request(HttpMethod::Post, &["volume"])
            .client_token(Some(&token))
            .build();
        assert_eq!(req.query_param("clientToken"), Some(Some("token-123")));

        let req = client().request(HttpMethod::Post, &["volume"]).client_token(None).build();
        assert!(req.query.is_empty());
    }

    #[test]
    fn check_status_reads_error_body() {
        let resp = HttpResponse::new(
            400,
            r#"{"code":"InvalidParameter","message":"bad cpu","requestId":"abc-123"}"#,
        );
        match check_status(&resp).unwrap_err() {
            ApiError::Provider {
                status,
                code,
                message,
                request_id,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("InvalidParameter"));
                assert_eq!(message, "bad cpu");
                assert_eq!(request_id.as_deref(), Some("abc-123"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_status_falls_back_to_header_request_id() {
        let resp = HttpResponse::new(502, "<html>bad gateway</html>").with_header(REQUEST_ID_HEADER, "hdr-1");
        let err = check_status(&resp).unwrap_err();
        assert_eq!(err.request_id(), Some("hdr-1"));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn mistyped_error_field_keeps_body_request_id() {
        let resp = HttpResponse::new(500, r#"{"code":503,"message":"busy","requestId":"abc-123"}"#);
        let err = check_status(&resp).unwrap_err();
        assert_eq!(err.request_id(), Some("abc-123"));
        match err {
            ApiError::Provider { status, code, message, .. } => {
                assert_eq!(status, 500);
                assert_eq!(code, None);
                assert_eq!(message, "busy");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[derive(Debug, serde::Deserialize)]
    struct BillingEcho {
        billing: crate::types::Billing,
    }

    #[test]
    fn prepaid_billing_without_reservation_is_malformed() {
        let resp = HttpResponse::new(200, r#"{"billing":{"paymentTiming":"Prepaid"}}"#)
            .with_header(REQUEST_ID_HEADER, "r-7");
        let err = decode_json::<BillingEcho>(&resp).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse { .. }));
        assert_eq!(err.request_id(), Some("r-7"));
    }

    #[test]
    fn reservation_echoed_under_postpaid_decodes() {
        let resp = HttpResponse::new(
            200,
            r#"{"billing":{"paymentTiming":"Postpaid","reservation":{"reservationLength":1,"reservationTimeUnit":"Month"}}}"#,
        );
        let echo = decode_json::<BillingEcho>(&resp).unwrap();
        assert_eq!(echo.billing, crate::types::Billing::Postpaid);
    }

    #[test]
    fn empty_success_body_is_malformed_for_typed_results() {
        let resp = HttpResponse::new(200, "").with_header(REQUEST_ID_HEADER, "r-1");
        let err = decode_json::<serde_json::Value>(&resp).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse { .. }));
        assert_eq!(err.request_id(), Some("r-1"));
    }

    #[test]
    fn decode_empty_accepts_any_2xx() {
        assert!(decode_empty(&HttpResponse::new(200, "")).is_ok());
        assert!(decode_empty(&HttpResponse::new(204, "")).is_ok());
    }

    #[test]
    fn validation_helpers() {
        assert!(require("imageId", "m-1").is_ok());
        assert!(matches!(require("imageId", " "), Err(ApiError::InvalidArgument(_))));
        assert!(require_opt("name", None).is_ok());
        assert!(require_positive("cpuCount", 0).is_err());
        assert!(require_positive_opt("purchaseCount", Some(0)).is_err());
        assert!(require_items::<String>("volumeIds", &[]).is_err());
    }
}
