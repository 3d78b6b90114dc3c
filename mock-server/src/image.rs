use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{action, done, new_id, paginate, parse, reply, require, BceError, Db, Params};

/// Public image every fresh store carries; handy for creating instances.
pub const SYSTEM_IMAGE_ID: &str = "m-ubuntu2204";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub image_type: String,
    pub os_type: String,
    pub os_version: String,
    pub os_name: String,
    pub os_arch: String,
    pub status: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(skip)]
    pub shared_users: Vec<SharedUser>,
    #[serde(skip)]
    pub copying_to: Vec<String>,
}

fn system_image(id: &str, name: &str, os_name: &str, os_version: &str) -> Image {
    Image {
        id: id.to_string(),
        name: name.to_string(),
        image_type: "System".to_string(),
        os_type: "linux".to_string(),
        os_version: os_version.to_string(),
        os_name: os_name.to_string(),
        os_arch: "x86_64 (64bit)".to_string(),
        status: "Available".to_string(),
        description: String::new(),
        shared_users: Vec::new(),
        copying_to: Vec::new(),
    }
}

pub(crate) fn system_images() -> Vec<Image> {
    vec![
        system_image(SYSTEM_IMAGE_ID, "Ubuntu 22.04", "Ubuntu", "22.04"),
        system_image("m-centos79", "CentOS 7.9", "CentOS", "7.9"),
    ]
}

pub(crate) fn routes() -> Router<Db> {
    Router::new()
        .route("/v2/image", get(list_images).post(create_image))
        .route("/v2/image/os", post(get_os))
        .route(
            "/v2/image/{id}",
            get(get_image).post(image_action).delete(delete_image),
        )
        .route("/v2/image/{id}/sharedUsers", get(shared_users))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateImage {
    image_name: String,
    #[serde(default)]
    instance_id: Option<String>,
    #[serde(default)]
    snapshot_id: Option<String>,
}

async fn create_image(
    State(db): State<Db>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let mut store = db.write().await;
    if let Some(previous) = store.replay("image", &params) {
        return Ok(reply(previous));
    }
    let input: CreateImage = parse(&body)?;
    require("imageName", &input.image_name)?;
    let base_image = match (&input.instance_id, &input.snapshot_id) {
        (Some(instance_id), None) => {
            let instance = store
                .instances
                .get(instance_id)
                .ok_or_else(|| BceError::not_found("instance", instance_id))?;
            Some(instance.image_id.clone())
        }
        (None, Some(snapshot_id)) => {
            if !store.snapshots.contains_key(snapshot_id) {
                return Err(BceError::not_found("snapshot", snapshot_id));
            }
            None
        }
        _ => return Err(BceError::invalid("exactly one of instanceId or snapshotId is required")),
    };
    let base = base_image.and_then(|id| store.images.get(&id).cloned());

    let id = new_id("m");
    let mut image = base.unwrap_or_else(|| system_image(&id, "", "Unknown", ""));
    image.id = id.clone();
    image.name = input.image_name;
    image.image_type = "Custom".to_string();
    image.status = "Available".to_string();
    image.shared_users.clear();
    image.copying_to.clear();
    store.images.insert(id.clone(), image);

    let response = json!({ "imageId": id });
    store.remember("image", &params, &response);
    Ok(reply(response))
}

async fn list_images(State(db): State<Db>, Query(params): Query<Params>) -> Result<Response, BceError> {
    let store = db.read().await;
    let wanted = params.get("imageType").map(String::as_str).filter(|t| *t != "All");
    let items = store
        .images
        .values()
        .filter(|image| wanted.is_none_or(|t| image.image_type == t))
        .collect();
    Ok(reply(paginate(items, |i: &Image| i.id.as_str(), &params, "images")?))
}

async fn get_image(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let store = db.read().await;
    let image = store.images.get(&id).ok_or_else(|| BceError::not_found("image", &id))?;
    Ok(reply(json!({ "image": image })))
}

async fn delete_image(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let mut store = db.write().await;
    let image = store.images.get(&id).ok_or_else(|| BceError::not_found("image", &id))?;
    if image.image_type == "System" {
        return Err(BceError::conflict("Image.SystemImage", format!("system image {id} cannot be deleted")));
    }
    store.images.remove(&id);
    Ok(done())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteCopy {
    #[serde(default)]
    dest_region: Vec<String>,
}

const IMAGE_ACTIONS: &[&str] = &["remoteCopy", "cancelRemoteCopy", "share", "unshare"];

async fn image_action(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let name = action(&params, IMAGE_ACTIONS)?;
    let mut store = db.write().await;
    let image = store.images.get_mut(&id).ok_or_else(|| BceError::not_found("image", &id))?;
    match name {
        "remoteCopy" => {
            let input: RemoteCopy = parse(&body)?;
            if input.dest_region.is_empty() {
                return Err(BceError::invalid("destRegion must not be empty"));
            }
            image.copying_to = input.dest_region;
        }
        "cancelRemoteCopy" => image.copying_to.clear(),
        "share" => {
            let user: SharedUser = parse(&body)?;
            if user.account.is_none() && user.account_id.is_none() {
                return Err(BceError::invalid("one of account or accountId is required"));
            }
            if image.image_type == "System" {
                return Err(BceError::conflict("Image.SystemImage", "system images are already public"));
            }
            if !image.shared_users.contains(&user) {
                image.shared_users.push(user);
            }
        }
        "unshare" => {
            let user: SharedUser = parse(&body)?;
            image.shared_users.retain(|existing| *existing != user);
        }
        other => return Err(BceError::invalid(format!("unsupported action {other}"))),
    }
    Ok(done())
}

async fn shared_users(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let store = db.read().await;
    let image = store.images.get(&id).ok_or_else(|| BceError::not_found("image", &id))?;
    Ok(reply(json!({ "users": image.shared_users })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OsQuery {
    instance_ids: Vec<String>,
}

async fn get_os(State(db): State<Db>, body: String) -> Result<Response, BceError> {
    let input: OsQuery = parse(&body)?;
    if input.instance_ids.is_empty() {
        return Err(BceError::invalid("instanceIds must not be empty"));
    }
    let store = db.read().await;
    let mut os_info = Vec::new();
    for instance_id in &input.instance_ids {
        let instance = store
            .instances
            .get(instance_id)
            .ok_or_else(|| BceError::not_found("instance", instance_id))?;
        let image = store.images.get(&instance.image_id);
        os_info.push(json!({
            "instanceId": instance_id,
            "osArch": image.map(|i| i.os_arch.as_str()).unwrap_or_default(),
            "osName": image.map(|i| i.os_name.as_str()).unwrap_or_default(),
            "osVersion": image.map(|i| i.os_version.as_str()).unwrap_or_default(),
            "osType": image.map(|i| i.os_type.as_str()).unwrap_or_default(),
            "osLang": "ENG",
        }));
    }
    Ok(reply(json!({ "osInfo": os_info })))
}
