//! Image DTOs.

use serde::{Deserialize, Serialize};

use super::common::ClientToken;
use crate::client::{require, require_items, require_opt};
use crate::error::ApiError;

/// Image source: a running instance or an existing snapshot, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Instance(String),
    Snapshot(String),
}

#[derive(Debug, Clone)]
pub struct CreateImageArgs {
    pub image_name: String,
    pub source: ImageSource,
    pub client_token: Option<ClientToken>,
}

impl CreateImageArgs {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require("imageName", &self.image_name)?;
        match &self.source {
            ImageSource::Instance(id) => require("instanceId", id),
            ImageSource::Snapshot(id) => require("snapshotId", id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateImageBody<'a> {
    pub image_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<&'a str>,
}

impl<'a> From<&'a CreateImageArgs> for CreateImageBody<'a> {
    fn from(args: &'a CreateImageArgs) -> Self {
        let (instance_id, snapshot_id) = match &args.source {
            ImageSource::Instance(id) => (Some(id.as_str()), None),
            ImageSource::Snapshot(id) => (None, Some(id.as_str())),
        };
        Self {
            image_name: &args.image_name,
            instance_id,
            snapshot_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageResult {
    pub image_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageType {
    All,
    System,
    Custom,
    Integration,
    Sharing,
    GpuSystem,
    GpuCustom,
    FpgaSystem,
    FpgaCustom,
}

impl ImageType {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageType::All => "All",
            ImageType::System => "System",
            ImageType::Custom => "Custom",
            ImageType::Integration => "Integration",
            ImageType::Sharing => "Sharing",
            ImageType::GpuSystem => "GpuSystem",
            ImageType::GpuCustom => "GpuCustom",
            ImageType::FpgaSystem => "FpgaSystem",
            ImageType::FpgaCustom => "FpgaCustom",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListImageArgs {
    pub image_type: Option<ImageType>,
    pub marker: Option<String>,
    pub max_keys: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageModel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub image_type: Option<String>,
    #[serde(default)]
    pub os_type: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub os_arch: Option<String>,
    #[serde(default)]
    pub os_name: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "desc")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetImageDetailResult {
    pub image: ImageModel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCopyImageArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub dest_region: Vec<String>,
}

impl RemoteCopyImageArgs {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require_items("destRegion", &self.dest_region)
    }
}

/// Account an image is shared with, by name or by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl SharedUser {
    pub fn by_id(account_id: &str) -> Self {
        Self {
            account: None,
            account_id: Some(account_id.to_string()),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        if self.account.is_none() && self.account_id.is_none() {
            return Err(ApiError::invalid("one of account or accountId is required"));
        }
        require_opt("account", self.account.as_deref())?;
        require_opt("accountId", self.account_id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetImageSharedUserResult {
    pub users: Vec<SharedUser>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetImageOsArgs {
    pub instance_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsModel {
    pub instance_id: String,
    #[serde(default)]
    pub os_arch: Option<String>,
    #[serde(default)]
    pub os_name: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub os_type: Option<String>,
    #[serde(default)]
    pub os_lang: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetImageOsResult {
    pub os_info: Vec<OsModel>,
}
