use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    action, advance, done, new_id, paginate, parse, purchase_count, reply, require, BceError, BillingInput, Db, Params, Store,
    Transition,
};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub volume_id: String,
    pub instance_id: String,
    pub device: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(rename = "type")]
    pub volume_type: String,
    pub storage_type: String,
    #[serde(rename = "diskSizeInGB")]
    pub disk_size_in_gb: u32,
    pub payment_timing: String,
    pub zone_name: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub is_system_volume: bool,
    pub encrypted: bool,
    pub attachments: Vec<Attachment>,
    #[serde(skip)]
    pub(crate) pending: Option<Transition>,
}

pub(crate) fn routes() -> Router<Db> {
    Router::new()
        .route("/v2/volume", get(list_volumes).post(create_volume))
        .route(
            "/v2/volume/{id}",
            get(get_volume)
                .put(volume_action)
                .delete(delete_volume)
                .post(delete_volume_with_snapshots),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateVolume {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    snapshot_id: Option<String>,
    #[serde(default)]
    zone_name: Option<String>,
    #[serde(default)]
    purchase_count: Option<u32>,
    #[serde(default, rename = "cdsSizeInGB")]
    cds_size_in_gb: Option<u32>,
    #[serde(default)]
    storage_type: Option<String>,
    #[serde(default)]
    billing: Option<BillingInput>,
    #[serde(default)]
    encrypt_key: Option<String>,
}

async fn create_volume(
    State(db): State<Db>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let mut store = db.write().await;
    if let Some(previous) = store.replay("volume", &params) {
        return Ok(reply(previous));
    }
    let input: CreateVolume = parse(&body)?;
    let payment_timing = match &input.billing {
        Some(billing) => billing.timing()?,
        None => "Postpaid",
    };
    let size = match (&input.snapshot_id, input.cds_size_in_gb) {
        (Some(snapshot_id), size) => {
            let snapshot = store
                .snapshots
                .get(snapshot_id)
                .ok_or_else(|| BceError::not_found("snapshot", snapshot_id))?;
            size.unwrap_or(snapshot.size_in_gb)
        }
        (None, Some(size)) => size,
        (None, None) => return Err(BceError::invalid("one of cdsSizeInGB or snapshotId is required")),
    };
    if size == 0 {
        return Err(BceError::invalid("cdsSizeInGB must be positive"));
    }
    let count = purchase_count(input.purchase_count)?;

    let mut ids = Vec::new();
    for _ in 0..count {
        let id = new_id("v");
        let volume = Volume {
            id: id.clone(),
            name: input.name.clone().unwrap_or_else(|| format!("volume-{}", &id[2..])),
            status: "Creating".to_string(),
            volume_type: "Cds".to_string(),
            storage_type: input.storage_type.clone().unwrap_or_else(|| "hp1".to_string()),
            disk_size_in_gb: size,
            payment_timing: payment_timing.to_string(),
            zone_name: input.zone_name.clone().unwrap_or_else(|| "cn-bj-a".to_string()),
            description: input.description.clone().unwrap_or_default(),
            is_system_volume: false,
            encrypted: input.encrypt_key.is_some(),
            attachments: Vec::new(),
            pending: Transition::after(1, "Available"),
        };
        store.volumes.insert(id.clone(), volume);
        ids.push(id);
    }
    let response = json!({ "volumeIds": ids });
    store.remember("volume", &params, &response);
    Ok(reply(response))
}

async fn list_volumes(State(db): State<Db>, Query(params): Query<Params>) -> Result<Response, BceError> {
    let store = db.read().await;
    let items = store
        .volumes
        .values()
        .filter(|volume| {
            params
                .get("instanceId")
                .is_none_or(|id| volume.attachments.iter().any(|a| a.instance_id == *id))
                && params.get("zoneName").is_none_or(|zone| volume.zone_name == *zone)
        })
        .collect();
    Ok(reply(paginate(items, |v: &Volume| v.id.as_str(), &params, "volumes")?))
}

async fn get_volume(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let mut store = db.write().await;
    let volume = store
        .volumes
        .get_mut(&id)
        .ok_or_else(|| BceError::not_found("volume", &id))?;
    advance(&mut volume.pending, &mut volume.status);
    Ok(reply(json!({ "volume": volume })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceRef {
    instance_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Resize {
    #[serde(rename = "newCdsSizeInGB")]
    new_cds_size_in_gb: u32,
    #[serde(default)]
    new_volume_type: Option<String>,
}

#[derive(Deserialize)]
struct BillingOnly {
    billing: BillingInput,
}

#[derive(Deserialize)]
struct Rename {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Modify {
    #[serde(default)]
    cds_name: Option<String>,
    #[serde(default)]
    desc: Option<String>,
}

const VOLUME_ACTIONS: &[&str] = &[
    "attach",
    "detach",
    "resize",
    "purchaseReserved",
    "rename",
    "modify",
    "modifyChargeType",
];

fn status_conflict(volume: &Volume, wanted: &str) -> BceError {
    BceError::conflict(
        "Volume.StatusConflict",
        format!("volume {} is {}, expected {wanted}", volume.id, volume.status),
    )
}

async fn volume_action(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let name = action(&params, VOLUME_ACTIONS)?;
    let mut store = db.write().await;

    if name == "attach" {
        let input: InstanceRef = parse(&body)?;
        if !store.instances.contains_key(&input.instance_id) {
            return Err(BceError::not_found("instance", &input.instance_id));
        }
        let volume = store
            .volumes
            .get_mut(&id)
            .ok_or_else(|| BceError::not_found("volume", &id))?;
        if volume.status != "Available" {
            return Err(status_conflict(volume, "Available"));
        }
        let attachment = Attachment {
            volume_id: id.clone(),
            instance_id: input.instance_id,
            device: "/dev/vdb".to_string(),
        };
        volume.attachments.push(attachment.clone());
        volume.status = "InUse".to_string();
        return Ok(reply(json!({ "volumeAttachment": attachment })));
    }

    let volume = store
        .volumes
        .get_mut(&id)
        .ok_or_else(|| BceError::not_found("volume", &id))?;
    match name {
        "detach" => {
            let input: InstanceRef = parse(&body)?;
            if !volume.attachments.iter().any(|a| a.instance_id == input.instance_id) {
                return Err(BceError::conflict(
                    "Volume.NotAttached",
                    format!("volume {id} is not attached to {}", input.instance_id),
                ));
            }
            volume.attachments.retain(|a| a.instance_id != input.instance_id);
            volume.status = "Available".to_string();
        }
        "resize" => {
            let input: Resize = parse(&body)?;
            if input.new_cds_size_in_gb <= volume.disk_size_in_gb {
                return Err(BceError::invalid(format!(
                    "newCdsSizeInGB must exceed the current {} GB",
                    volume.disk_size_in_gb
                )));
            }
            if volume.status != "Available" && volume.status != "InUse" {
                return Err(status_conflict(volume, "Available or InUse"));
            }
            let settled = if volume.status == "InUse" { "InUse" } else { "Available" };
            volume.disk_size_in_gb = input.new_cds_size_in_gb;
            if let Some(storage_type) = input.new_volume_type {
                volume.storage_type = storage_type;
            }
            volume.status = "Scaling".to_string();
            volume.pending = Transition::after(1, settled);
        }
        "purchaseReserved" => {
            let input: BillingOnly = parse(&body)?;
            if input.billing.timing()? != "Prepaid" {
                return Err(BceError::invalid("purchaseReserved requires Prepaid billing"));
            }
            volume.payment_timing = "Prepaid".to_string();
        }
        "rename" => {
            let input: Rename = parse(&body)?;
            require("name", &input.name)?;
            volume.name = input.name;
        }
        "modify" => {
            let input: Modify = parse(&body)?;
            if input.cds_name.is_none() && input.desc.is_none() {
                return Err(BceError::invalid("one of cdsName or desc is required"));
            }
            if let Some(cds_name) = input.cds_name {
                volume.name = cds_name;
            }
            if let Some(desc) = input.desc {
                volume.description = desc;
            }
        }
        "modifyChargeType" => {
            let input: BillingOnly = parse(&body)?;
            volume.payment_timing = input.billing.timing()?.to_string();
        }
        other => return Err(BceError::invalid(format!("unsupported action {other}"))),
    }
    Ok(done())
}

fn remove_detached(store: &mut Store, id: &str) -> Result<(), BceError> {
    let volume = store.volumes.get(id).ok_or_else(|| BceError::not_found("volume", id))?;
    if !volume.attachments.is_empty() {
        return Err(status_conflict(volume, "Available"));
    }
    store.volumes.remove(id);
    for asp in store.asps.values_mut() {
        asp.volume_ids.retain(|v| v != id);
    }
    Ok(())
}

async fn delete_volume(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let mut store = db.write().await;
    remove_detached(&mut store, &id)?;
    Ok(done())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteOptions {
    #[serde(default)]
    manual_snapshot: Option<String>,
    #[serde(default)]
    auto_snapshot: Option<String>,
    #[serde(default)]
    recycle: Option<String>,
}

fn switch(field: &str, value: Option<&str>) -> Result<bool, BceError> {
    match value {
        None | Some("off") => Ok(false),
        Some("on") => Ok(true),
        Some(other) => Err(BceError::invalid(format!("{field} must be on or off, got {other}"))),
    }
}

async fn delete_volume_with_snapshots(
    State(db): State<Db>,
    Path(id): Path<String>,
    body: String,
) -> Result<Response, BceError> {
    let input: DeleteOptions = parse(&body)?;
    let manual = switch("manualSnapshot", input.manual_snapshot.as_deref())?;
    let auto = switch("autoSnapshot", input.auto_snapshot.as_deref())?;
    switch("recycle", input.recycle.as_deref())?;

    let mut store = db.write().await;
    remove_detached(&mut store, &id)?;
    store.snapshots.retain(|_, snapshot| {
        let owned = snapshot.volume_id == id;
        let drop = match snapshot.create_method.as_str() {
            "manual" => manual,
            _ => auto,
        };
        !(owned && drop)
    });
    Ok(done())
}
