use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{action, done, new_id, paginate, parse, reply, require, BceError, Db, Params};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    #[serde(rename = "sizeInGB")]
    pub size_in_gb: u32,
    pub status: String,
    pub create_method: String,
    pub volume_id: String,
    #[serde(rename = "desc")]
    pub description: String,
}

/// Auto snapshot policy.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asp {
    pub id: String,
    pub name: String,
    pub time_points: Vec<String>,
    pub repeat_weekdays: Vec<String>,
    pub retention_days: i32,
    pub status: String,
    #[serde(skip)]
    pub volume_ids: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AspView<'a> {
    #[serde(flatten)]
    asp: &'a Asp,
    volume_count: usize,
}

impl Asp {
    fn view(&self) -> AspView<'_> {
        AspView {
            asp: self,
            volume_count: self.volume_ids.len(),
        }
    }
}

pub(crate) fn routes() -> Router<Db> {
    Router::new()
        .route("/v2/snapshot", get(list_snapshots).post(create_snapshot))
        .route("/v2/snapshot/{id}", get(get_snapshot).delete(delete_snapshot))
        .route("/v2/asp", get(list_asps).post(create_asp))
        .route(
            "/v2/asp/{id}",
            get(get_asp).put(asp_action).delete(delete_asp),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSnapshot {
    volume_id: String,
    snapshot_name: String,
    #[serde(default)]
    desc: Option<String>,
}

async fn create_snapshot(
    State(db): State<Db>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let mut store = db.write().await;
    if let Some(previous) = store.replay("snapshot", &params) {
        return Ok(reply(previous));
    }
    let input: CreateSnapshot = parse(&body)?;
    require("snapshotName", &input.snapshot_name)?;
    let volume = store
        .volumes
        .get(&input.volume_id)
        .ok_or_else(|| BceError::not_found("volume", &input.volume_id))?;
    let id = new_id("s");
    let snapshot = Snapshot {
        id: id.clone(),
        name: input.snapshot_name,
        size_in_gb: volume.disk_size_in_gb,
        status: "Available".to_string(),
        create_method: "manual".to_string(),
        volume_id: input.volume_id,
        description: input.desc.unwrap_or_default(),
    };
    store.snapshots.insert(id.clone(), snapshot);
    let response = json!({ "snapshotId": id });
    store.remember("snapshot", &params, &response);
    Ok(reply(response))
}

async fn list_snapshots(State(db): State<Db>, Query(params): Query<Params>) -> Result<Response, BceError> {
    let store = db.read().await;
    let items = store
        .snapshots
        .values()
        .filter(|s| params.get("volumeId").is_none_or(|v| s.volume_id == *v))
        .collect();
    Ok(reply(paginate(items, |s: &Snapshot| s.id.as_str(), &params, "snapshots")?))
}

async fn get_snapshot(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let store = db.read().await;
    let snapshot = store
        .snapshots
        .get(&id)
        .ok_or_else(|| BceError::not_found("snapshot", &id))?;
    Ok(reply(json!({ "snapshot": snapshot })))
}

async fn delete_snapshot(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let mut store = db.write().await;
    store
        .snapshots
        .remove(&id)
        .ok_or_else(|| BceError::not_found("snapshot", &id))?;
    Ok(done())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAsp {
    name: String,
    time_points: Vec<String>,
    repeat_weekdays: Vec<String>,
    retention_days: String,
}

fn in_range(field: &str, values: &[String], max: u8) -> Result<(), BceError> {
    if values.is_empty() {
        return Err(BceError::invalid(format!("{field} must not be empty")));
    }
    for value in values {
        match value.parse::<u8>() {
            Ok(n) if n <= max => {}
            _ => return Err(BceError::invalid(format!("{field} entries must be 0..={max}, got {value}"))),
        }
    }
    Ok(())
}

async fn create_asp(
    State(db): State<Db>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let mut store = db.write().await;
    if let Some(previous) = store.replay("asp", &params) {
        return Ok(reply(previous));
    }
    let input: CreateAsp = parse(&body)?;
    require("name", &input.name)?;
    in_range("timePoints", &input.time_points, 23)?;
    in_range("repeatWeekdays", &input.repeat_weekdays, 6)?;
    // -1 keeps snapshots forever.
    let retention_days = match input.retention_days.parse::<i32>() {
        Ok(days) if days == -1 || days > 0 => days,
        _ => {
            return Err(BceError::invalid(format!(
                "retentionDays must be -1 or a positive number, got {}",
                input.retention_days
            )))
        }
    };
    let id = new_id("asp");
    let asp = Asp {
        id: id.clone(),
        name: input.name,
        time_points: input.time_points,
        repeat_weekdays: input.repeat_weekdays,
        retention_days,
        status: "active".to_string(),
        volume_ids: Vec::new(),
    };
    store.asps.insert(id.clone(), asp);
    let response = json!({ "aspId": id });
    store.remember("asp", &params, &response);
    Ok(reply(response))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AspVolumes {
    volume_ids: Vec<String>,
}

async fn asp_action(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let name = action(&params, &["attach", "detach"])?;
    let input: AspVolumes = parse(&body)?;
    if input.volume_ids.is_empty() {
        return Err(BceError::invalid("volumeIds must not be empty"));
    }
    let mut store = db.write().await;
    if let Some(missing) = input.volume_ids.iter().find(|v| !store.volumes.contains_key(*v)) {
        return Err(BceError::not_found("volume", missing));
    }
    let asp = store.asps.get_mut(&id).ok_or_else(|| BceError::not_found("asp", &id))?;
    for volume_id in input.volume_ids {
        if name == "attach" {
            if !asp.volume_ids.contains(&volume_id) {
                asp.volume_ids.push(volume_id);
            }
        } else {
            asp.volume_ids.retain(|v| *v != volume_id);
        }
    }
    Ok(done())
}

async fn list_asps(State(db): State<Db>, Query(params): Query<Params>) -> Result<Response, BceError> {
    let store = db.read().await;
    let volume_named = |asp: &Asp, name: &str| {
        asp.volume_ids
            .iter()
            .filter_map(|id| store.volumes.get(id))
            .any(|volume| volume.name == name)
    };
    let views: Vec<AspView<'_>> = store
        .asps
        .values()
        .filter(|asp| {
            params.get("aspName").is_none_or(|name| asp.name == *name)
                && params.get("volumeName").is_none_or(|name| volume_named(asp, name.as_str()))
        })
        .map(Asp::view)
        .collect();
    Ok(reply(paginate(
        views.iter().collect(),
        |v| v.asp.id.as_str(),
        &params,
        "autoSnapshotPolicys",
    )?))
}

async fn get_asp(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let store = db.read().await;
    let asp = store.asps.get(&id).ok_or_else(|| BceError::not_found("asp", &id))?;
    Ok(reply(json!({ "autoSnapshotPolicy": asp.view() })))
}

async fn delete_asp(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let mut store = db.write().await;
    store.asps.remove(&id).ok_or_else(|| BceError::not_found("asp", &id))?;
    Ok(done())
}
