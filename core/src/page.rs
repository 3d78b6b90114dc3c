//! Marker-based pagination for list operations.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::client::{decode_json, malformed};
use crate::error::ApiError;
use crate::http::HttpResponse;

/// One page of a list call. The decoder never fetches further pages; callers
/// resubmit `next_marker()` as the `marker` of their next list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub marker: Option<String>,
    pub is_truncated: bool,
    pub next_marker: Option<String>,
    pub max_keys: Option<u32>,
}

impl<T> Page<T> {
    /// Marker for the following page, or `None` on the last page.
    pub fn next_marker(&self) -> Option<&str> {
        if self.is_truncated {
            self.next_marker.as_deref()
        } else {
            None
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_marker().is_none()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageEnvelope {
    #[serde(default)]
    marker: Option<String>,
    is_truncated: bool,
    #[serde(default)]
    next_marker: Option<String>,
    #[serde(default)]
    max_keys: Option<u32>,
}

/// Decode a list body whose items live under `items_key`.
pub(crate) fn decode_page<T: DeserializeOwned>(response: &HttpResponse, items_key: &str) -> Result<Page<T>, ApiError> {
    let mut body: Value = decode_json(response)?;
    let items = body
        .get_mut(items_key)
        .map(Value::take)
        .ok_or_else(|| malformed(response, format!("missing field `{items_key}`")))?;
    let items: Vec<T> = serde_json::from_value(items).map_err(|e| malformed(response, format!("{items_key}: {e}")))?;
    let envelope: PageEnvelope = serde_json::from_value(body).map_err(|e| malformed(response, e.to_string()))?;

    let next_marker = envelope.next_marker.filter(|m| !m.is_empty());
    if envelope.is_truncated && next_marker.is_none() {
        return Err(malformed(response, "truncated page without nextMarker"));
    }
    Ok(Page {
        items,
        marker: envelope.marker.filter(|m| !m.is_empty()),
        is_truncated: envelope.is_truncated,
        next_marker,
        max_keys: envelope.max_keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    #[test]
    fn truncated_page_exposes_next_marker() {
        let resp = HttpResponse::new(
            200,
            r#"{"marker":"","isTruncated":true,"nextMarker":"i-2","maxKeys":1,"instances":[{"id":"i-1"}]}"#,
        );
        let page: Page<Item> = decode_page(&resp, "instances").unwrap();
        assert_eq!(page.items, vec![Item { id: "i-1".to_string() }]);
        assert_eq!(page.marker, None);
        assert_eq!(page.next_marker(), Some("i-2"));
        assert_eq!(page.max_keys, Some(1));
        assert!(!page.is_last());
    }

    #[test]
    fn last_page_hides_stale_next_marker() {
        let resp = HttpResponse::new(200, r#"{"isTruncated":false,"nextMarker":"x","volumes":[]}"#);
        let page: Page<Item> = decode_page(&resp, "volumes").unwrap();
        assert!(page.is_last());
        assert_eq!(page.next_marker(), None);
    }

    #[test]
    fn truncated_without_next_marker_is_malformed() {
        let resp = HttpResponse::new(200, r#"{"isTruncated":true,"instances":[]}"#);
        let err = decode_page::<Item>(&resp, "instances").unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse { .. }));
    }

    #[test]
    fn missing_items_or_flag_is_malformed() {
        let resp = HttpResponse::new(200, r#"{"isTruncated":false}"#);
        assert!(decode_page::<Item>(&resp, "images").is_err());

        let resp = HttpResponse::new(200, r#"{"images":[]}"#);
        assert!(decode_page::<Item>(&resp, "images").is_err());
    }
}
