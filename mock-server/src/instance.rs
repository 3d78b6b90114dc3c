use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    action, advance, done, new_id, paginate, parse, purchase_count, reply, require, BceError, BillingInput, Db, Params,
    Store, Tag, Transition,
};

const ZONES: [&str; 3] = ["cn-bj-a", "cn-bj-b", "cn-bj-c"];

/// `(spec, family, cpu, memory GB)` offered by `/v2/instance/spec`.
const SPECS: [(&str, &str, u32, u32); 4] = [
    ("bcc.g4.c1m4", "N4", 1, 4),
    ("bcc.g4.c2m8", "N4", 2, 8),
    ("bcc.c4.c4m8", "C4", 4, 8),
    ("bcc.m4.c2m16", "M4", 2, 16),
];

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub payment_timing: String,
    pub cpu_count: u32,
    #[serde(rename = "memoryCapacityInGB")]
    pub memory_capacity_in_gb: u32,
    pub image_id: String,
    pub zone_name: String,
    pub internal_ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keypair_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_set_id: Option<String>,
    pub tags: Vec<Tag>,
    #[serde(skip)]
    pub security_group_ids: Vec<String>,
    #[serde(skip)]
    pub private_ips: Vec<String>,
    #[serde(skip)]
    pub stopped_without_charge: bool,
    #[serde(skip)]
    pub(crate) pending: Option<Transition>,
}

pub(crate) fn routes() -> Router<Db> {
    Router::new()
        .route("/v2/instance", get(list_instances).post(create_instance))
        .route("/v2/instanceBySpec", axum::routing::post(create_instance_by_spec))
        .route("/v2/instance/noChargeList", get(list_no_charge))
        .route("/v2/instance/spec", get(list_spec))
        .route("/v2/instance/rebuild", put(batch_rebuild))
        .route("/v2/instance/batchAddIp", put(batch_add_ip))
        .route("/v2/instance/batchDelIp", put(batch_del_ip))
        .route("/v2/instance/cancelBidOrder", axum::routing::post(cancel_bid_order))
        .route(
            "/v2/instance/{id}",
            get(get_instance)
                .put(instance_action)
                .post(change_to_prepaid)
                .delete(delete_instance),
        )
        .route("/v2/instance/{id}/vnc", get(get_vnc))
        .route("/v2/instance/{id}/tag", put(change_tags))
        .route("/v2/zone", get(list_zones))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateInstance {
    image_id: String,
    billing: BillingInput,
    cpu_count: u32,
    #[serde(rename = "memoryCapacityInGB")]
    memory_capacity_in_gb: u32,
    #[serde(default)]
    purchase_count: Option<u32>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    zone_name: Option<String>,
    #[serde(default)]
    keypair_id: Option<String>,
    #[serde(default)]
    deploy_id: Option<String>,
    #[serde(default)]
    security_group_id: Option<String>,
    #[serde(default)]
    tags: Option<Vec<Tag>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateInstanceBySpec {
    image_id: String,
    spec: String,
    billing: BillingInput,
    #[serde(default)]
    purchase_count: Option<u32>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    zone_name: Option<String>,
    #[serde(default)]
    keypair_id: Option<String>,
    #[serde(default)]
    deploy_id: Option<String>,
    #[serde(default)]
    security_group_id: Option<String>,
    #[serde(default)]
    tags: Option<Vec<Tag>>,
}

/// Fields shared by both create calls once validated.
struct Launch {
    image_id: String,
    payment_timing: &'static str,
    cpu_count: u32,
    memory_capacity_in_gb: u32,
    purchase_count: u32,
    name: Option<String>,
    zone_name: Option<String>,
    keypair_id: Option<String>,
    deploy_id: Option<String>,
    security_group_id: Option<String>,
    tags: Vec<Tag>,
}

fn spec(name: &str) -> Result<(u32, u32), BceError> {
    SPECS
        .iter()
        .find(|(spec, ..)| *spec == name)
        .map(|(_, _, cpu, memory)| (*cpu, *memory))
        .ok_or_else(|| BceError::invalid(format!("unknown spec {name}")))
}

fn launch(store: &mut Store, input: Launch) -> Result<Vec<String>, BceError> {
    require("imageId", &input.image_id)?;
    if !store.images.contains_key(&input.image_id) {
        return Err(BceError::not_found("image", &input.image_id));
    }
    if input.cpu_count == 0 || input.memory_capacity_in_gb == 0 {
        return Err(BceError::invalid("cpuCount and memoryCapacityInGB must be positive"));
    }
    let zone_name = input.zone_name.unwrap_or_else(|| ZONES[0].to_string());
    if !ZONES.contains(&zone_name.as_str()) {
        return Err(BceError::invalid(format!("unknown zone {zone_name}")));
    }
    if let Some(group) = &input.security_group_id {
        if !store.security_groups.contains_key(group) {
            return Err(BceError::not_found("securityGroup", group));
        }
    }
    if let Some(deploy_set) = &input.deploy_id {
        if !store.deploy_sets.contains_key(deploy_set) {
            return Err(BceError::not_found("deploySet", deploy_set));
        }
    }

    let mut ids = Vec::new();
    for _ in 0..input.purchase_count {
        let id = new_id("i");
        let host = store.instances.len() % 250 + 2;
        let instance = Instance {
            id: id.clone(),
            name: input.name.clone().unwrap_or_else(|| format!("instance-{}", &id[2..])),
            status: "Creating".to_string(),
            description: String::new(),
            payment_timing: input.payment_timing.to_string(),
            cpu_count: input.cpu_count,
            memory_capacity_in_gb: input.memory_capacity_in_gb,
            image_id: input.image_id.clone(),
            zone_name: zone_name.clone(),
            internal_ip: format!("192.168.0.{host}"),
            keypair_id: input.keypair_id.clone(),
            deploy_set_id: input.deploy_id.clone(),
            tags: input.tags.clone(),
            security_group_ids: input.security_group_id.iter().cloned().collect(),
            private_ips: Vec::new(),
            stopped_without_charge: false,
            pending: Transition::after(2, "Running"),
        };
        store.instances.insert(id.clone(), instance);
        ids.push(id);
    }
    tracing::info!(count = ids.len(), "instances created");
    Ok(ids)
}

async fn create_instance(
    State(db): State<Db>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let mut store = db.write().await;
    if let Some(previous) = store.replay("instance", &params) {
        return Ok(reply(previous));
    }
    let input: CreateInstance = parse(&body)?;
    let ids = launch(
        &mut store,
        Launch {
            image_id: input.image_id,
            payment_timing: input.billing.timing()?,
            cpu_count: input.cpu_count,
            memory_capacity_in_gb: input.memory_capacity_in_gb,
            purchase_count: purchase_count(input.purchase_count)?,
            name: input.name,
            zone_name: input.zone_name,
            keypair_id: input.keypair_id,
            deploy_id: input.deploy_id,
            security_group_id: input.security_group_id,
            tags: input.tags.unwrap_or_default(),
        },
    )?;
    let response = json!({ "instanceIds": ids });
    store.remember("instance", &params, &response);
    Ok(reply(response))
}

async fn create_instance_by_spec(
    State(db): State<Db>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let mut store = db.write().await;
    if let Some(previous) = store.replay("instanceBySpec", &params) {
        return Ok(reply(previous));
    }
    let input: CreateInstanceBySpec = parse(&body)?;
    let (cpu_count, memory_capacity_in_gb) = spec(&input.spec)?;
    let ids = launch(
        &mut store,
        Launch {
            image_id: input.image_id,
            payment_timing: input.billing.timing()?,
            cpu_count,
            memory_capacity_in_gb,
            purchase_count: purchase_count(input.purchase_count)?,
            name: input.name,
            zone_name: input.zone_name,
            keypair_id: input.keypair_id,
            deploy_id: input.deploy_id,
            security_group_id: input.security_group_id,
            tags: input.tags.unwrap_or_default(),
        },
    )?;
    let response = json!({ "instanceIds": ids });
    store.remember("instanceBySpec", &params, &response);
    Ok(reply(response))
}

fn matches_filters(instance: &Instance, params: &Params) -> bool {
    params.get("zoneName").is_none_or(|zone| instance.zone_name == *zone)
        && params.get("internalIp").is_none_or(|ip| instance.internal_ip == *ip)
        && params.get("dedicatedHostId").is_none()
}

async fn list_instances(State(db): State<Db>, Query(params): Query<Params>) -> Result<Response, BceError> {
    let store = db.read().await;
    let items = store
        .instances
        .values()
        .filter(|instance| matches_filters(instance, &params))
        .collect();
    Ok(reply(paginate(items, |i: &Instance| i.id.as_str(), &params, "instances")?))
}

async fn list_no_charge(State(db): State<Db>, Query(params): Query<Params>) -> Result<Response, BceError> {
    let store = db.read().await;
    let items = store
        .instances
        .values()
        .filter(|instance| instance.stopped_without_charge && matches_filters(instance, &params))
        .collect();
    Ok(reply(paginate(items, |i: &Instance| i.id.as_str(), &params, "instances")?))
}

async fn get_instance(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let mut store = db.write().await;
    let instance = store
        .instances
        .get_mut(&id)
        .ok_or_else(|| BceError::not_found("instance", &id))?;
    advance(&mut instance.pending, &mut instance.status);
    Ok(reply(json!({ "instance": instance })))
}

async fn delete_instance(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let mut store = db.write().await;
    store
        .instances
        .remove(&id)
        .ok_or_else(|| BceError::not_found("instance", &id))?;
    for volume in store.volumes.values_mut() {
        if volume.attachments.iter().any(|a| a.instance_id == id) {
            volume.attachments.clear();
            volume.status = "Available".to_string();
        }
    }
    Ok(done())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Resize {
    cpu_count: u32,
    #[serde(rename = "memoryCapacityInGB")]
    memory_capacity_in_gb: u32,
}

#[derive(Deserialize)]
struct ResizeBySpec {
    spec: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stop {
    #[serde(default)]
    force_stop: bool,
    #[serde(default)]
    stop_with_no_charge: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Rebuild {
    image_id: String,
    #[serde(default)]
    admin_pass: Option<String>,
    #[serde(default)]
    keypair_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePass {
    admin_pass: String,
}

#[derive(Deserialize)]
struct ModifyAttribute {
    name: String,
}

#[derive(Deserialize)]
struct ModifyDesc {
    desc: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PurchaseReserved {
    billing: BillingInput,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecurityGroupBinding {
    security_group_id: String,
}

const INSTANCE_ACTIONS: &[&str] = &[
    "resize",
    "resizeBySpec",
    "stop",
    "start",
    "reboot",
    "rebuild",
    "changePass",
    "modifyAttribute",
    "modifyDesc",
    "purchaseReserved",
    "bind",
    "unbind",
];

async fn instance_action(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let name = action(&params, INSTANCE_ACTIONS)?;
    let mut store = db.write().await;
    let Store {
        instances,
        security_groups,
        images,
        ..
    } = &mut *store;
    let instance = instances
        .get_mut(&id)
        .ok_or_else(|| BceError::not_found("instance", &id))?;

    match name {
        "resize" => {
            let input: Resize = parse(&body)?;
            if input.cpu_count == 0 || input.memory_capacity_in_gb == 0 {
                return Err(BceError::invalid("cpuCount and memoryCapacityInGB must be positive"));
            }
            instance.cpu_count = input.cpu_count;
            instance.memory_capacity_in_gb = input.memory_capacity_in_gb;
        }
        "resizeBySpec" => {
            let input: ResizeBySpec = parse(&body)?;
            let (cpu, memory) = spec(&input.spec)?;
            instance.cpu_count = cpu;
            instance.memory_capacity_in_gb = memory;
        }
        "stop" => {
            let input: Stop = parse(&body)?;
            if instance.status != "Running" && !input.force_stop {
                return Err(BceError::conflict(
                    "Instance.StatusConflict",
                    format!("instance {id} is {}", instance.status),
                ));
            }
            instance.status = "Stopped".to_string();
            instance.pending = None;
            instance.stopped_without_charge = input.stop_with_no_charge;
        }
        "start" => {
            instance.status = "Running".to_string();
            instance.pending = None;
            instance.stopped_without_charge = false;
        }
        "reboot" => instance.status = "Running".to_string(),
        "rebuild" => {
            let input: Rebuild = parse(&body)?;
            if !images.contains_key(&input.image_id) {
                return Err(BceError::not_found("image", &input.image_id));
            }
            if input.admin_pass.is_none() && input.keypair_id.is_none() {
                return Err(BceError::invalid("one of adminPass or keypairId is required"));
            }
            instance.image_id = input.image_id;
            if input.keypair_id.is_some() {
                instance.keypair_id = input.keypair_id;
            }
        }
        "changePass" => {
            let input: ChangePass = parse(&body)?;
            require("adminPass", &input.admin_pass)?;
        }
        "modifyAttribute" => {
            let input: ModifyAttribute = parse(&body)?;
            require("name", &input.name)?;
            instance.name = input.name;
        }
        "modifyDesc" => {
            let input: ModifyDesc = parse(&body)?;
            instance.description = input.desc;
        }
        "purchaseReserved" => {
            let input: PurchaseReserved = parse(&body)?;
            if input.billing.timing()? != "Prepaid" {
                return Err(BceError::invalid("purchaseReserved requires Prepaid billing"));
            }
            instance.payment_timing = "Prepaid".to_string();
        }
        "bind" => {
            let input: SecurityGroupBinding = parse(&body)?;
            if !security_groups.contains_key(&input.security_group_id) {
                return Err(BceError::not_found("securityGroup", &input.security_group_id));
            }
            if !instance.security_group_ids.contains(&input.security_group_id) {
                instance.security_group_ids.push(input.security_group_id);
            }
        }
        "unbind" => {
            let input: SecurityGroupBinding = parse(&body)?;
            let before = instance.security_group_ids.len();
            instance.security_group_ids.retain(|g| *g != input.security_group_id);
            if instance.security_group_ids.len() == before {
                return Err(BceError::not_found("securityGroup binding", &input.security_group_id));
            }
        }
        other => return Err(BceError::invalid(format!("unsupported action {other}"))),
    }
    Ok(done())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToPrepay {
    duration: u32,
}

async fn change_to_prepaid(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    action(&params, &["toPrepay"])?;
    let input: ToPrepay = parse(&body)?;
    if input.duration == 0 {
        return Err(BceError::invalid("duration must be positive"));
    }
    let mut store = db.write().await;
    let instance = store
        .instances
        .get_mut(&id)
        .ok_or_else(|| BceError::not_found("instance", &id))?;
    instance.payment_timing = "Prepaid".to_string();
    Ok(reply(json!({ "orderId": new_id("od") })))
}

async fn get_vnc(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let store = db.read().await;
    if !store.instances.contains_key(&id) {
        return Err(BceError::not_found("instance", &id));
    }
    Ok(reply(json!({ "vncUrl": format!("ws://127.0.0.1/vnc/{id}") })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeTags {
    change_tags: Vec<Tag>,
}

async fn change_tags(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let name = action(&params, &["bind", "unbind"])?;
    let input: ChangeTags = parse(&body)?;
    let mut store = db.write().await;
    let instance = store
        .instances
        .get_mut(&id)
        .ok_or_else(|| BceError::not_found("instance", &id))?;
    if name == "bind" {
        for tag in input.change_tags {
            if !instance.tags.contains(&tag) {
                instance.tags.push(tag);
            }
        }
    } else {
        instance.tags.retain(|tag| !input.change_tags.contains(tag));
    }
    Ok(done())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchRebuild {
    image_id: String,
    #[serde(default)]
    admin_pass: Option<String>,
    #[serde(default)]
    keypair_id: Option<String>,
    instance_ids: Vec<String>,
}

async fn batch_rebuild(State(db): State<Db>, body: String) -> Result<Response, BceError> {
    let input: BatchRebuild = parse(&body)?;
    if input.admin_pass.is_none() && input.keypair_id.is_none() {
        return Err(BceError::invalid("one of adminPass or keypairId is required"));
    }
    let mut store = db.write().await;
    if !store.images.contains_key(&input.image_id) {
        return Err(BceError::not_found("image", &input.image_id));
    }
    if let Some(missing) = input.instance_ids.iter().find(|id| !store.instances.contains_key(*id)) {
        return Err(BceError::not_found("instance", missing));
    }
    for id in &input.instance_ids {
        if let Some(instance) = store.instances.get_mut(id) {
            instance.image_id = input.image_id.clone();
        }
    }
    Ok(done())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchAddIp {
    instance_id: String,
    #[serde(default)]
    private_ips: Option<Vec<String>>,
    #[serde(default)]
    secondary_private_ip_address_count: Option<u32>,
}

async fn batch_add_ip(State(db): State<Db>, body: String) -> Result<Response, BceError> {
    let input: BatchAddIp = parse(&body)?;
    let mut store = db.write().await;
    let instance = store
        .instances
        .get_mut(&input.instance_id)
        .ok_or_else(|| BceError::not_found("instance", &input.instance_id))?;
    let added = match (input.private_ips, input.secondary_private_ip_address_count) {
        (Some(ips), _) if !ips.is_empty() => ips,
        (_, Some(count)) if count > 0 => {
            let base = instance.private_ips.len() + 100;
            (0..count as usize).map(|n| format!("192.168.1.{}", base + n)).collect()
        }
        _ => {
            return Err(BceError::invalid(
                "one of privateIps or secondaryPrivateIpAddressCount is required",
            ))
        }
    };
    instance.private_ips.extend(added.iter().cloned());
    Ok(reply(json!({ "privateIps": added })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchDelIp {
    instance_id: String,
    private_ips: Vec<String>,
}

async fn batch_del_ip(State(db): State<Db>, body: String) -> Result<Response, BceError> {
    let input: BatchDelIp = parse(&body)?;
    let mut store = db.write().await;
    let instance = store
        .instances
        .get_mut(&input.instance_id)
        .ok_or_else(|| BceError::not_found("instance", &input.instance_id))?;
    instance.private_ips.retain(|ip| !input.private_ips.contains(ip));
    Ok(done())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancelBidOrder {
    order_id: String,
}

async fn cancel_bid_order(body: String) -> Result<Response, BceError> {
    let input: CancelBidOrder = parse(&body)?;
    require("orderId", &input.order_id)?;
    Ok(reply(json!({ "orderId": input.order_id })))
}

async fn list_spec() -> Response {
    let instance_types: Vec<_> = SPECS
        .iter()
        .map(|(name, family, cpu, memory)| {
            json!({
                "type": family,
                "name": name,
                "cpuCount": cpu,
                "memoryCapacityInGB": memory,
                "localDiskSizeInGB": 0,
            })
        })
        .collect();
    reply(json!({ "instanceTypes": instance_types }))
}

async fn list_zones() -> Response {
    let zones: Vec<_> = ZONES.iter().map(|zone| json!({ "zoneName": zone })).collect();
    reply(json!({ "zones": zones }))
}
