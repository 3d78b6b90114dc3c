//! Security group DTOs.

use serde::{Deserialize, Serialize};

use super::common::{ClientToken, TagModel};
use crate::client::require;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ingress,
    Egress,
}

/// One rule. Every field but `direction` is optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupRuleModel {
    pub direction: Direction,
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

impl SecurityGroupRuleModel {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            remark: None,
            ethertype: None,
            port_range: None,
            protocol: None,
            source_group_id: None,
            source_ip: None,
            dest_group_id: None,
            dest_ip: None,
            security_group_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecurityGroupArgs {
    pub name: String,
    #[serde(rename = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    pub rules: Vec<SecurityGroupRuleModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagModel>>,
    #[serde(skip)]
    pub client_token: Option<ClientToken>,
}

impl CreateSecurityGroupArgs {
    pub fn new(name: &str, rules: Vec<SecurityGroupRuleModel>) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            vpc_id: None,
            rules,
            tags: None,
            client_token: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require("name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecurityGroupResult {
    pub security_group_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSecurityGroupArgs {
    pub instance_id: Option<String>,
    pub vpc_id: Option<String>,
    pub marker: Option<String>,
    pub max_keys: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupModel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vpc_id: Option<String>,
    #[serde(default, rename = "desc")]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<SecurityGroupRuleModel>,
    #[serde(default)]
    pub tags: Vec<TagModel>,
}

/// Body of authorize and revoke calls.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityGroupRuleArgs {
    pub rule: SecurityGroupRuleModel,
}
