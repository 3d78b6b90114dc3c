use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{done, new_id, parse, reply, BceError, Db, Params};

const STRATEGIES: [&str; 3] = ["HOST_HA", "RACK_HA", "TOR_HA"];

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploySet {
    #[serde(rename = "deploysetId")]
    pub id: String,
    pub strategy: String,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub concurrency: u32,
}

pub(crate) fn routes() -> Router<Db> {
    Router::new()
        .route("/v2/instance/deployset/create", post(create_deploy_set))
        .route("/v2/instance/deployset/list", get(list_deploy_sets))
        .route("/v2/instance/deployset/{id}/modifyAttribute", put(modify_deploy_set))
        .route("/v2/instance/deployset/{id}", delete(delete_deploy_set))
}

#[derive(Deserialize)]
struct CreateDeploySet {
    strategy: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    desc: Option<String>,
}

async fn create_deploy_set(
    State(db): State<Db>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let mut store = db.write().await;
    if let Some(previous) = store.replay("deployset", &params) {
        return Ok(reply(previous));
    }
    let input: CreateDeploySet = parse(&body)?;
    if !STRATEGIES.contains(&input.strategy.as_str()) {
        return Err(BceError::invalid(format!("unknown strategy {}", input.strategy)));
    }
    let id = new_id("dset");
    let deploy_set = DeploySet {
        id: id.clone(),
        strategy: input.strategy,
        name: input.name.unwrap_or_default(),
        description: input.desc.unwrap_or_default(),
        concurrency: 1,
    };
    store.deploy_sets.insert(id.clone(), deploy_set);
    let response = json!({ "deploySetIds": [id] });
    store.remember("deployset", &params, &response);
    Ok(reply(response))
}

async fn list_deploy_sets(State(db): State<Db>) -> Result<Response, BceError> {
    let store = db.read().await;
    let deploy_sets: Vec<&DeploySet> = store.deploy_sets.values().collect();
    Ok(reply(json!({ "deploySets": deploy_sets })))
}

#[derive(Deserialize)]
struct ModifyDeploySet {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    desc: Option<String>,
}

async fn modify_deploy_set(
    State(db): State<Db>,
    Path(id): Path<String>,
    body: String,
) -> Result<Response, BceError> {
    let input: ModifyDeploySet = parse(&body)?;
    if input.name.is_none() && input.desc.is_none() {
        return Err(BceError::invalid("one of name or desc is required"));
    }
    let mut store = db.write().await;
    let deploy_set = store
        .deploy_sets
        .get_mut(&id)
        .ok_or_else(|| BceError::not_found("deploySet", &id))?;
    if let Some(name) = input.name {
        deploy_set.name = name;
    }
    if let Some(desc) = input.desc {
        deploy_set.description = desc;
    }
    Ok(done())
}

async fn delete_deploy_set(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let mut store = db.write().await;
    if !store.deploy_sets.contains_key(&id) {
        return Err(BceError::not_found("deploySet", &id));
    }
    if store
        .instances
        .values()
        .any(|i| i.deploy_set_id.as_deref() == Some(id.as_str()))
    {
        return Err(BceError::conflict(
            "DeploySet.InUse",
            format!("deploy set {id} still holds instances"),
        ));
    }
    store.deploy_sets.remove(&id);
    Ok(done())
}
