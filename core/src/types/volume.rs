//! CDS volume DTOs.

use serde::{Deserialize, Serialize};

use super::billing::{Billing, Reservation};
use super::common::{ClientToken, StorageType, Switch};
use crate::client::{require_opt, require_positive, require_positive_opt};
use crate::error::ApiError;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCdsVolumeArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_count: Option<u32>,
    #[serde(rename = "cdsSizeInGB", skip_serializing_if = "Option::is_none")]
    pub cds_size_in_gb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<StorageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<Billing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypt_key: Option<String>,
    #[serde(skip)]
    pub client_token: Option<ClientToken>,
}

impl CreateCdsVolumeArgs {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        if self.cds_size_in_gb.is_none() && self.snapshot_id.is_none() {
            return Err(ApiError::invalid("one of cdsSizeInGB or snapshotId is required"));
        }
        require_positive_opt("cdsSizeInGB", self.cds_size_in_gb)?;
        require_positive_opt("purchaseCount", self.purchase_count)?;
        require_opt("snapshotId", self.snapshot_id.as_deref())?;
        if let Some(billing) = &self.billing {
            billing.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCdsVolumeResult {
    pub volume_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCdsVolumeArgs {
    pub instance_id: Option<String>,
    pub zone_name: Option<String>,
    pub marker: Option<String>,
    pub max_keys: Option<u32>,
}

/// Volume lifecycle status as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeStatus {
    Creating,
    Available,
    Attaching,
    NotAvailable,
    InUse,
    Detaching,
    Deleting,
    Deleted,
    Scaling,
    Expired,
    Error,
    SnapshotProcessing,
    ImageProcessing,
    Recharging,
    #[serde(other)]
    Unknown,
}

impl VolumeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VolumeStatus::Creating => "Creating",
            VolumeStatus::Available => "Available",
            VolumeStatus::Attaching => "Attaching",
            VolumeStatus::NotAvailable => "NotAvailable",
            VolumeStatus::InUse => "InUse",
            VolumeStatus::Detaching => "Detaching",
            VolumeStatus::Deleting => "Deleting",
            VolumeStatus::Deleted => "Deleted",
            VolumeStatus::Scaling => "Scaling",
            VolumeStatus::Expired => "Expired",
            VolumeStatus::Error => "Error",
            VolumeStatus::SnapshotProcessing => "SnapshotProcessing",
            VolumeStatus::ImageProcessing => "ImageProcessing",
            VolumeStatus::Recharging => "Recharging",
            VolumeStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeAttachmentModel {
    pub volume_id: String,
    pub instance_id: String,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeModel {
    pub id: String,
    pub status: VolumeStatus,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "diskSizeInGB")]
    pub disk_size_in_gb: u32,
    #[serde(default, rename = "type")]
    pub volume_type: Option<String>,
    #[serde(default)]
    pub storage_type: Option<String>,
    #[serde(default)]
    pub payment_timing: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub expire_time: Option<String>,
    #[serde(default, rename = "desc")]
    pub description: Option<String>,
    #[serde(default)]
    pub zone_name: Option<String>,
    #[serde(default)]
    pub is_system_volume: bool,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub attachments: Vec<VolumeAttachmentModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetVolumeDetailResult {
    pub volume: VolumeModel,
}

/// Body of attach and detach calls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInstanceArgs {
    pub instance_id: String,
}

impl VolumeInstanceArgs {
    pub fn new(instance_id: &str) -> Self {
        Self {
            instance_id: instance_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachVolumeResult {
    pub volume_attachment: VolumeAttachmentModel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeCdsVolumeArgs {
    #[serde(rename = "newCdsSizeInGB")]
    pub new_cds_size_in_gb: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_volume_type: Option<StorageType>,
    #[serde(skip)]
    pub client_token: Option<ClientToken>,
}

impl ResizeCdsVolumeArgs {
    pub fn new(new_cds_size_in_gb: u32) -> Self {
        Self {
            new_cds_size_in_gb,
            new_volume_type: None,
            client_token: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require_positive("newCdsSizeInGB", self.new_cds_size_in_gb)
    }
}

#[derive(Debug, Clone)]
pub struct PurchaseReservedCdsVolumeArgs {
    pub reservation: Reservation,
    pub client_token: Option<ClientToken>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BillingBody {
    pub billing: Billing,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenameCdsVolumeArgs {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyCdsVolumeArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cds_name: Option<String>,
    #[serde(rename = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ModifyCdsVolumeArgs {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        if self.cds_name.is_none() && self.description.is_none() {
            return Err(ApiError::invalid("one of cdsName or desc is required"));
        }
        require_opt("cdsName", self.cds_name.as_deref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModifyChargeTypeCdsVolumeArgs {
    pub billing: Billing,
}

/// Body of the snapshot-aware delete (`POST /v2/volume/{id}`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCdsVolumeArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_snapshot: Option<Switch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_snapshot: Option<Switch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recycle: Option<Switch>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_volume_omits_unset_fields() {
        let args = CreateCdsVolumeArgs {
            cds_size_in_gb: Some(40),
            storage_type: Some(StorageType::Ssd),
            billing: Some(Billing::Postpaid),
            purchase_count: Some(1),
            ..Default::default()
        };
        let body = serde_json::to_value(&args).unwrap();
        assert_eq!(
            body,
            json!({
                "purchaseCount": 1,
                "cdsSizeInGB": 40,
                "storageType": "ssd",
                "billing": {"paymentTiming": "Postpaid"}
            })
        );
    }

    #[test]
    fn create_volume_needs_size_or_snapshot() {
        assert!(CreateCdsVolumeArgs::default().validate().is_err());
        let from_snapshot = CreateCdsVolumeArgs {
            snapshot_id: Some("s-1".to_string()),
            ..Default::default()
        };
        assert!(from_snapshot.validate().is_ok());
    }

    #[test]
    fn volume_status_in_use_wire_name() {
        let status: VolumeStatus = serde_json::from_str("\"InUse\"").unwrap();
        assert_eq!(status, VolumeStatus::InUse);
        let unknown: VolumeStatus = serde_json::from_str("\"Migrating\"").unwrap();
        assert_eq!(unknown, VolumeStatus::Unknown);
    }

    #[test]
    fn modify_needs_at_least_one_field() {
        assert!(ModifyCdsVolumeArgs::default().validate().is_err());
        let args = ModifyCdsVolumeArgs {
            description: Some("d".to_string()),
            ..Default::default()
        };
        assert!(args.validate().is_ok());
    }

    #[test]
    fn delete_args_serialize_switches() {
        let args = DeleteCdsVolumeArgs {
            auto_snapshot: Some(Switch::On),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&args).unwrap(), json!({"autoSnapshot": "on"}));
    }
}
