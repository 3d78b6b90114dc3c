//! Client configuration: credentials and endpoint.
//!
//! The on-disk shape matches the SDK conf file used by the live test suites:
//! `{"AK": "...", "SK": "...", "Endpoint": "..."}`.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::ApiError;

/// Service domain used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "bcc.bj.baidubce.com";

/// Immutable client configuration.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(rename = "AK")]
    pub access_key: String,
    #[serde(rename = "SK")]
    pub secret_key: String,
    #[serde(rename = "Endpoint", default)]
    pub endpoint: String,
}

impl ClientConfig {
    pub fn new(access_key: &str, secret_key: &str, endpoint: &str) -> Self {
        Self {
            access_key: access_key.trim().to_string(),
            secret_key: secret_key.trim().to_string(),
            endpoint: endpoint.trim().to_string(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ApiError> {
        let config: ClientConfig =
            serde_json::from_str(raw).map_err(|e| ApiError::Config(format!("invalid config json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    /// Access and secret key must both be set.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.access_key.trim().is_empty() {
            return Err(ApiError::Config("access key (AK) is empty".to_string()));
        }
        if self.secret_key.trim().is_empty() {
            return Err(ApiError::Config("secret key (SK) is empty".to_string()));
        }
        Ok(())
    }

    /// Endpoint as an absolute base URL without a trailing slash.
    ///
    /// An empty endpoint falls back to [`DEFAULT_ENDPOINT`]; a bare host gets
    /// an `http://` scheme.
    pub fn base_url(&self) -> String {
        let endpoint = self.endpoint.trim().trim_end_matches('/');
        let endpoint = if endpoint.is_empty() { DEFAULT_ENDPOINT } else { endpoint };
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("http://{endpoint}")
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sdk_conf_shape() {
        let config =
            ClientConfig::from_json_str(r#"{"AK":"ak","SK":"sk","Endpoint":"bcc.gz.baidubce.com"}"#).unwrap();
        assert_eq!(config.access_key, "ak");
        assert_eq!(config.base_url(), "http://bcc.gz.baidubce.com");
    }

    #[test]
    fn missing_endpoint_uses_default_domain() {
        let config = ClientConfig::from_json_str(r#"{"AK":"ak","SK":"sk"}"#).unwrap();
        assert_eq!(config.base_url(), format!("http://{DEFAULT_ENDPOINT}"));
    }

    #[test]
    fn empty_endpoint_is_accepted_and_uses_default_domain() {
        let config = ClientConfig::from_json_str(r#"{"AK":"ak","SK":"sk","Endpoint":" "}"#).unwrap();
        assert_eq!(config.base_url(), format!("http://{DEFAULT_ENDPOINT}"));
    }

    #[test]
    fn explicit_scheme_and_trailing_slash() {
        let config = ClientConfig::new("ak", "sk", "https://127.0.0.1:8080/");
        assert_eq!(config.base_url(), "https://127.0.0.1:8080");
    }

    #[test]
    fn empty_secret_is_rejected() {
        let err = ClientConfig::from_json_str(r#"{"AK":"ak","SK":"  "}"#).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let err = ClientConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = ClientConfig::from_json_file("/nonexistent/go_conf.json").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn debug_redacts_secret() {
        let config = ClientConfig::new("ak", "super-secret", "");
        let text = format!("{config:?}");
        assert!(!text.contains("super-secret"));
        assert!(text.contains("<redacted>"));
    }
}
