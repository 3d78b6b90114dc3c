//! In-memory mock of the BCC management API.
//!
//! Serves the `/v2` surface with provider-shaped JSON: errors carry
//! `{code, message, requestId}` and an `x-bce-request-id` header, actions are
//! selected by a bare query key (`PUT /v2/instance/{id}?stop`), lists honour
//! `marker`/`maxKeys`, and `clientToken` makes creates idempotent.
//!
//! Freshly created instances report `Creating` for two detail reads before
//! turning `Running`; volumes report `Creating` for one read before turning
//! `Available`. List calls never advance a resource.

mod deploy_set;
mod error;
mod image;
mod instance;
mod security_group;
mod snapshot;
mod volume;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub use error::BceError;
pub use image::SYSTEM_IMAGE_ID;
pub use instance::Instance;
pub use volume::Volume;

pub const REQUEST_ID_HEADER: &str = "x-bce-request-id";

const DEFAULT_MAX_KEYS: usize = 1000;

/// Upper bound on `purchaseCount` for a single create call.
pub const MAX_PURCHASE_COUNT: u32 = 100;

pub(crate) type Params = HashMap<String, String>;

/// Everything the mock knows, keyed by id so listings come back in a stable order.
#[derive(Default)]
pub struct Store {
    instances: BTreeMap<String, instance::Instance>,
    volumes: BTreeMap<String, volume::Volume>,
    security_groups: BTreeMap<String, security_group::SecurityGroup>,
    images: BTreeMap<String, image::Image>,
    snapshots: BTreeMap<String, snapshot::Snapshot>,
    asps: BTreeMap<String, snapshot::Asp>,
    deploy_sets: BTreeMap<String, deploy_set::DeploySet>,
    /// Responses of create calls, keyed by route and `clientToken`.
    tokens: HashMap<(&'static str, String), Value>,
}

impl Store {
    /// A store seeded with the public system images.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        for image in image::system_images() {
            store.images.insert(image.id.clone(), image);
        }
        store
    }

    /// Replay a create call that already succeeded with the same token.
    fn replay(&self, route: &'static str, params: &Params) -> Option<Value> {
        let token = params.get("clientToken")?;
        self.tokens.get(&(route, token.clone())).cloned()
    }

    fn remember(&mut self, route: &'static str, params: &Params, response: &Value) {
        if let Some(token) = params.get("clientToken") {
            self.tokens.insert((route, token.clone()), response.clone());
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .merge(instance::routes())
        .merge(deploy_set::routes())
        .merge(volume::routes())
        .merge(security_group::routes())
        .merge(image::routes())
        .merge(snapshot::routes())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub(crate) fn request_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn new_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &raw[..8])
}

/// 200 with a JSON body.
pub(crate) fn reply(body: Value) -> Response {
    ([(REQUEST_ID_HEADER, request_id())], Json(body)).into_response()
}

/// 200 with an empty body, as action calls answer.
pub(crate) fn done() -> Response {
    [(REQUEST_ID_HEADER, request_id())].into_response()
}

pub(crate) fn parse<T: DeserializeOwned>(body: &str) -> Result<T, BceError> {
    let body = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body).map_err(|e| BceError::malformed_json(e.to_string()))
}

/// The single bare action key present in the query, among `known`.
pub(crate) fn action(params: &Params, known: &[&'static str]) -> Result<&'static str, BceError> {
    known
        .iter()
        .copied()
        .find(|name| params.contains_key(*name))
        .ok_or_else(|| BceError::invalid(format!("expected one of the actions {known:?}")))
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), BceError> {
    if value.trim().is_empty() {
        return Err(BceError::invalid(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn purchase_count(requested: Option<u32>) -> Result<u32, BceError> {
    match requested.unwrap_or(1) {
        0 => Err(BceError::invalid("purchaseCount must be positive")),
        n if n > MAX_PURCHASE_COUNT => Err(BceError::invalid(format!(
            "purchaseCount must not exceed {MAX_PURCHASE_COUNT}"
        ))),
        n => Ok(n),
    }
}

/// Marker pagination over items already sorted by id. The marker is the id
/// of the first item of the requested page.
pub(crate) fn paginate<T: Serialize>(
    items: Vec<&T>,
    id_of: impl Fn(&T) -> &str,
    params: &Params,
    key: &str,
) -> Result<Value, BceError> {
    let max_keys = match params.get("maxKeys") {
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| BceError::invalid(format!("maxKeys must be a positive integer, got {raw}")))?,
        None => DEFAULT_MAX_KEYS,
    };
    let marker = params.get("marker").map(String::as_str).unwrap_or("");
    let start = if marker.is_empty() {
        0
    } else {
        items.iter().position(|item| id_of(*item) >= marker).unwrap_or(items.len())
    };
    let end = (start + max_keys).min(items.len());
    let next_marker = items.get(end).map(|item| id_of(*item).to_string());

    let mut page = json!({
        "marker": marker,
        "isTruncated": next_marker.is_some(),
        "nextMarker": next_marker.unwrap_or_default(),
        "maxKeys": max_keys,
    });
    page[key] = serde_json::to_value(&items[start..end])
        .map_err(|e| BceError::new(StatusCode::INTERNAL_SERVER_ERROR, "InternalError", e.to_string()))?;
    Ok(page)
}

/// A pending status change, applied after `reads_left` more detail reads.
#[derive(Clone, Debug)]
pub(crate) struct Transition {
    pub reads_left: u32,
    pub target: &'static str,
}

impl Transition {
    pub fn after(reads_left: u32, target: &'static str) -> Option<Self> {
        Some(Self { reads_left, target })
    }
}

/// Count one detail read against `pending`, settling `status` once due.
pub(crate) fn advance(pending: &mut Option<Transition>, status: &mut String) {
    if let Some(transition) = pending {
        if transition.reads_left == 0 {
            *status = transition.target.to_string();
            *pending = None;
        } else {
            transition.reads_left -= 1;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub tag_key: String,
    #[serde(default)]
    pub tag_value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReservationInput {
    reservation_length: u32,
    #[serde(default)]
    reservation_time_unit: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BillingInput {
    payment_timing: String,
    #[serde(default)]
    reservation: Option<ReservationInput>,
}

impl BillingInput {
    /// Validated payment timing.
    pub fn timing(&self) -> Result<&'static str, BceError> {
        match self.payment_timing.as_str() {
            "Prepaid" => {
                let reservation = self
                    .reservation
                    .as_ref()
                    .ok_or_else(|| BceError::invalid("Prepaid billing requires a reservation"))?;
                if reservation.reservation_length == 0 {
                    return Err(BceError::invalid("reservationLength must be positive"));
                }
                match reservation.reservation_time_unit.as_deref() {
                    None | Some("Month") | Some("Year") => Ok("Prepaid"),
                    Some(other) => Err(BceError::invalid(format!("unknown reservationTimeUnit {other}"))),
                }
            }
            "Postpaid" => Ok("Postpaid"),
            "bidding" => Ok("bidding"),
            other => Err(BceError::invalid(format!("unknown paymentTiming {other}"))),
        }
    }
}
