//! Snapshot and auto snapshot policy (ASP) DTOs.

use serde::{Deserialize, Serialize};

use super::common::ClientToken;
use crate::client::{require, require_items};
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnapshotArgs {
    pub volume_id: String,
    pub snapshot_name: String,
    #[serde(rename = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip)]
    pub client_token: Option<ClientToken>,
}

impl CreateSnapshotArgs {
    pub fn new(volume_id: &str, snapshot_name: &str) -> Self {
        Self {
            volume_id: volume_id.to_string(),
            snapshot_name: snapshot_name.to_string(),
            description: None,
            client_token: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require("volumeId", &self.volume_id)?;
        require("snapshotName", &self.snapshot_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnapshotResult {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSnapshotArgs {
    pub volume_id: Option<String>,
    pub marker: Option<String>,
    pub max_keys: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotModel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "sizeInGB")]
    pub size_in_gb: u32,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub create_method: Option<String>,
    #[serde(default)]
    pub volume_id: Option<String>,
    #[serde(default, rename = "desc")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetSnapshotDetailResult {
    pub snapshot: SnapshotModel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAspArgs {
    pub name: String,
    /// Hours of the day (`"0"`..`"23"`) at which snapshots are taken.
    pub time_points: Vec<String>,
    /// Weekdays (`"0"`..`"6"`) on which the policy runs.
    pub repeat_weekdays: Vec<String>,
    /// Days to keep each snapshot; `"-1"` keeps them forever.
    pub retention_days: String,
    #[serde(skip)]
    pub client_token: Option<ClientToken>,
}

impl CreateAspArgs {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require("name", &self.name)?;
        require_items("timePoints", &self.time_points)?;
        require_items("repeatWeekdays", &self.repeat_weekdays)?;
        require("retentionDays", &self.retention_days)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAspResult {
    pub asp_id: String,
}

/// Body of ASP attach and detach calls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AspVolumesArgs {
    pub volume_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAspArgs {
    pub asp_name: Option<String>,
    pub volume_name: Option<String>,
    pub marker: Option<String>,
    pub max_keys: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspModel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub time_points: Vec<String>,
    #[serde(default)]
    pub repeat_weekdays: Vec<String>,
    #[serde(default)]
    pub retention_days: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub last_execute_time: Option<String>,
    #[serde(default)]
    pub volume_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAspResult {
    pub auto_snapshot_policy: AspModel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asp_validation() {
        let args = CreateAspArgs {
            name: "nightly".to_string(),
            time_points: vec!["20".to_string()],
            repeat_weekdays: vec![],
            retention_days: "7".to_string(),
            client_token: None,
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn snapshot_requires_volume() {
        assert!(CreateSnapshotArgs::new("", "snap").validate().is_err());
        assert!(CreateSnapshotArgs::new("v-1", "snap").validate().is_ok());
    }
}
