//! Deploy set (placement group) DTOs.

use serde::{Deserialize, Serialize};

use super::common::ClientToken;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploySetStrategy {
    #[serde(rename = "HOST_HA")]
    HostHa,
    #[serde(rename = "RACK_HA")]
    RackHa,
    #[serde(rename = "TOR_HA")]
    TorHa,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDeploySetArgs {
    pub strategy: DeploySetStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip)]
    pub client_token: Option<ClientToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploySetResult {
    pub deploy_set_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploySetModel {
    #[serde(rename = "deploysetId")]
    pub deploy_set_id: String,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "desc")]
    pub description: Option<String>,
    #[serde(default)]
    pub concurrency: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDeploySetsResult {
    pub deploy_sets: Vec<DeploySetModel>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ModifyDeploySetArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ModifyDeploySetArgs {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        if self.name.is_none() && self.description.is_none() {
            return Err(ApiError::invalid("one of name or desc is required"));
        }
        Ok(())
    }
}
