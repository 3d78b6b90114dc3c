use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{action, done, new_id, paginate, parse, reply, require, BceError, Db, Params, Tag};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub direction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethertype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_group_id: Option<String>,
}

impl Rule {
    fn check(&self) -> Result<(), BceError> {
        match self.direction.as_str() {
            "ingress" | "egress" => Ok(()),
            other => Err(BceError::invalid(format!("direction must be ingress or egress, got {other}"))),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
    pub vpc_id: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub rules: Vec<Rule>,
    pub tags: Vec<Tag>,
}

pub(crate) fn routes() -> Router<Db> {
    Router::new()
        .route("/v2/securityGroup", get(list_groups).post(create_group))
        .route("/v2/securityGroup/{id}", axum::routing::put(rule_action).delete(delete_group))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateGroup {
    name: String,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    vpc_id: Option<String>,
    #[serde(default)]
    rules: Vec<Rule>,
    #[serde(default)]
    tags: Vec<Tag>,
}

async fn create_group(
    State(db): State<Db>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let mut store = db.write().await;
    if let Some(previous) = store.replay("securityGroup", &params) {
        return Ok(reply(previous));
    }
    let input: CreateGroup = parse(&body)?;
    require("name", &input.name)?;
    for rule in &input.rules {
        rule.check()?;
    }
    let id = new_id("g");
    let group = SecurityGroup {
        id: id.clone(),
        name: input.name,
        vpc_id: input.vpc_id.unwrap_or_else(|| "vpc-default".to_string()),
        description: input.desc.unwrap_or_default(),
        rules: input
            .rules
            .into_iter()
            .map(|rule| Rule {
                security_group_id: Some(id.clone()),
                ..rule
            })
            .collect(),
        tags: input.tags,
    };
    store.security_groups.insert(id.clone(), group);
    let response = json!({ "securityGroupId": id });
    store.remember("securityGroup", &params, &response);
    Ok(reply(response))
}

async fn list_groups(State(db): State<Db>, Query(params): Query<Params>) -> Result<Response, BceError> {
    let store = db.read().await;
    let bound = match params.get("instanceId") {
        Some(id) => Some(
            &store
                .instances
                .get(id)
                .ok_or_else(|| BceError::not_found("instance", id))?
                .security_group_ids,
        ),
        None => None,
    };
    let items = store
        .security_groups
        .values()
        .filter(|group| {
            bound.is_none_or(|ids| ids.contains(&group.id))
                && params.get("vpcId").is_none_or(|vpc| group.vpc_id == *vpc)
        })
        .collect();
    Ok(reply(paginate(items, |g: &SecurityGroup| g.id.as_str(), &params, "securityGroups")?))
}

#[derive(Deserialize)]
struct RuleBody {
    rule: Rule,
}

async fn rule_action(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
    body: String,
) -> Result<Response, BceError> {
    let name = action(&params, &["authorizeRule", "revokeRule"])?;
    let input: RuleBody = parse(&body)?;
    input.rule.check()?;
    let mut store = db.write().await;
    let group = store
        .security_groups
        .get_mut(&id)
        .ok_or_else(|| BceError::not_found("securityGroup", &id))?;
    let rule = Rule {
        security_group_id: Some(id.clone()),
        ..input.rule
    };
    if name == "authorizeRule" {
        if group.rules.contains(&rule) {
            return Err(BceError::conflict("SecurityGroup.RuleDuplicated", "rule already exists"));
        }
        group.rules.push(rule);
    } else {
        let before = group.rules.len();
        group.rules.retain(|existing| *existing != rule);
        if group.rules.len() == before {
            return Err(BceError::not_found("securityGroup rule in", &id));
        }
    }
    Ok(done())
}

async fn delete_group(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, BceError> {
    let mut store = db.write().await;
    if !store.security_groups.contains_key(&id) {
        return Err(BceError::not_found("securityGroup", &id));
    }
    if store.instances.values().any(|i| i.security_group_ids.contains(&id)) {
        return Err(BceError::conflict(
            "SecurityGroup.InUse",
            format!("security group {id} is bound to an instance"),
        ));
    }
    store.security_groups.remove(&id);
    Ok(done())
}
