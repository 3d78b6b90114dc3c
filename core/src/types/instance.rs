//! Instance DTOs: request arguments, results and the instance detail record.
//!
//! Optional request fields are `Option` and skipped when unset, so "not
//! given" never reaches the wire as `null` or zero. Response records are
//! strict only on identifiers and status.

use serde::{Deserialize, Serialize};

use super::billing::{Billing, Reservation};
use super::common::{ClientToken, InstanceType, StorageType, TagModel};
use crate::client::{require, require_items, require_opt, require_positive, require_positive_opt};
use crate::error::ApiError;

/// Extra CDS volume created together with an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCdsModel {
    #[serde(rename = "cdsSizeInGB")]
    pub cds_size_in_gb: u32,
    pub storage_type: StorageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypt_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceArgs {
    pub image_id: String,
    pub billing: Billing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<InstanceType>,
    pub cpu_count: u32,
    #[serde(rename = "memoryCapacityInGB")]
    pub memory_capacity_in_gb: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_disk_size_in_gb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_disk_storage_type: Option<StorageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_cds_list: Option<Vec<CreateCdsModel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_capacity_in_mbps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eip_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedicate_host_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_pass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_card: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fpga_card: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_renew_time_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_renew_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cds_auto_renew: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_tag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagModel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keypair_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_ips: Option<Vec<String>>,
    #[serde(skip)]
    pub client_token: Option<ClientToken>,
}

impl CreateInstanceArgs {
    /// Arguments with only the required fields set.
    pub fn new(image_id: &str, billing: Billing, cpu_count: u32, memory_capacity_in_gb: u32) -> Self {
        Self {
            image_id: image_id.to_string(),
            billing,
            instance_type: None,
            cpu_count,
            memory_capacity_in_gb,
            root_disk_size_in_gb: None,
            root_disk_storage_type: None,
            create_cds_list: None,
            network_capacity_in_mbps: None,
            eip_name: None,
            dedicate_host_id: None,
            purchase_count: None,
            name: None,
            hostname: None,
            admin_pass: None,
            zone_name: None,
            subnet_id: None,
            security_group_id: None,
            gpu_card: None,
            fpga_card: None,
            card_count: None,
            auto_renew_time_unit: None,
            auto_renew_time: None,
            cds_auto_renew: None,
            relation_tag: None,
            tags: None,
            keypair_id: None,
            deploy_id: None,
            bid_model: None,
            bid_price: None,
            internal_ips: None,
            client_token: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require("imageId", &self.image_id)?;
        self.billing.validate()?;
        require_positive("cpuCount", self.cpu_count)?;
        require_positive("memoryCapacityInGB", self.memory_capacity_in_gb)?;
        require_positive_opt("purchaseCount", self.purchase_count)?;
        require_positive_opt("rootDiskSizeInGb", self.root_disk_size_in_gb)?;
        for cds in self.create_cds_list.iter().flatten() {
            require_positive("createCdsList.cdsSizeInGB", cds.cds_size_in_gb)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceBySpecArgs {
    pub image_id: String,
    pub spec: String,
    pub billing: Billing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_disk_size_in_gb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_disk_storage_type: Option<StorageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_cds_list: Option<Vec<CreateCdsModel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_capacity_in_mbps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_pass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keypair_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagModel>>,
    #[serde(skip)]
    pub client_token: Option<ClientToken>,
}

impl CreateInstanceBySpecArgs {
    pub fn new(image_id: &str, spec: &str, billing: Billing) -> Self {
        Self {
            image_id: image_id.to_string(),
            spec: spec.to_string(),
            billing,
            root_disk_size_in_gb: None,
            root_disk_storage_type: None,
            create_cds_list: None,
            network_capacity_in_mbps: None,
            purchase_count: None,
            name: None,
            hostname: None,
            admin_pass: None,
            zone_name: None,
            subnet_id: None,
            security_group_id: None,
            keypair_id: None,
            deploy_id: None,
            tags: None,
            client_token: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require("imageId", &self.image_id)?;
        require("spec", &self.spec)?;
        self.billing.validate()?;
        require_positive_opt("purchaseCount", self.purchase_count)
    }
}

/// Result of every instance-creating call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceResult {
    pub instance_ids: Vec<String>,
}

/// Query for `ListInstances` and `GetInstanceNoChargeList`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListInstanceArgs {
    pub marker: Option<String>,
    pub max_keys: Option<u32>,
    pub internal_ip: Option<String>,
    pub dedicated_host_id: Option<String>,
    pub zone_name: Option<String>,
}

/// Instance lifecycle status as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceStatus {
    Creating,
    Starting,
    Running,
    Stopping,
    Stopped,
    Scaling,
    Deleted,
    Expired,
    Error,
    SnapshotProcessing,
    ImageProcessing,
    Recharging,
    #[serde(other)]
    Unknown,
}

impl InstanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InstanceStatus::Creating => "Creating",
            InstanceStatus::Starting => "Starting",
            InstanceStatus::Running => "Running",
            InstanceStatus::Stopping => "Stopping",
            InstanceStatus::Stopped => "Stopped",
            InstanceStatus::Scaling => "Scaling",
            InstanceStatus::Deleted => "Deleted",
            InstanceStatus::Expired => "Expired",
            InstanceStatus::Error => "Error",
            InstanceStatus::SnapshotProcessing => "SnapshotProcessing",
            InstanceStatus::ImageProcessing => "ImageProcessing",
            InstanceStatus::Recharging => "Recharging",
            InstanceStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceModel {
    #[serde(rename = "id")]
    pub instance_id: String,
    pub status: InstanceStatus,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instance_type: Option<String>,
    #[serde(default, rename = "desc")]
    pub description: Option<String>,
    #[serde(default)]
    pub payment_timing: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub expire_time: Option<String>,
    #[serde(default)]
    pub internal_ip: Option<String>,
    #[serde(default)]
    pub public_ip: Option<String>,
    #[serde(default)]
    pub cpu_count: u32,
    #[serde(default, rename = "memoryCapacityInGB")]
    pub memory_capacity_in_gb: u32,
    #[serde(default, rename = "localDiskSizeInGB")]
    pub local_disk_size_in_gb: u32,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub network_capacity_in_mbps: u32,
    #[serde(default)]
    pub zone_name: Option<String>,
    #[serde(default)]
    pub subnet_id: Option<String>,
    #[serde(default)]
    pub vpc_id: Option<String>,
    #[serde(default)]
    pub keypair_id: Option<String>,
    #[serde(default)]
    pub deploy_set_id: Option<String>,
    #[serde(default)]
    pub auto_renew: bool,
    #[serde(default)]
    pub tags: Vec<TagModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetInstanceDetailResult {
    pub instance: InstanceModel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeInstanceArgs {
    pub cpu_count: u32,
    #[serde(rename = "memoryCapacityInGB")]
    pub memory_capacity_in_gb: u32,
    #[serde(skip)]
    pub client_token: Option<ClientToken>,
}

impl ResizeInstanceArgs {
    pub fn new(cpu_count: u32, memory_capacity_in_gb: u32) -> Self {
        Self {
            cpu_count,
            memory_capacity_in_gb,
            client_token: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require_positive("cpuCount", self.cpu_count)?;
        require_positive("memoryCapacityInGB", self.memory_capacity_in_gb)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResizeInstanceBySpecArgs {
    pub spec: String,
    #[serde(skip)]
    pub client_token: Option<ClientToken>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StopInstanceBody {
    pub force_stop: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_with_no_charge: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RebootInstanceBody {
    pub force_stop: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildInstanceArgs {
    pub image_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_pass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keypair_id: Option<String>,
}

impl RebuildInstanceArgs {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require("imageId", &self.image_id)?;
        require_opt("adminPass", self.admin_pass.as_deref())?;
        require_opt("keypairId", self.keypair_id.as_deref())?;
        if self.admin_pass.is_none() && self.keypair_id.is_none() {
            return Err(ApiError::invalid("one of adminPass or keypairId is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRebuildInstanceArgs {
    pub image_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_pass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keypair_id: Option<String>,
    pub instance_ids: Vec<String>,
}

impl BatchRebuildInstanceArgs {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        RebuildInstanceArgs {
            image_id: self.image_id.clone(),
            admin_pass: self.admin_pass.clone(),
            keypair_id: self.keypair_id.clone(),
        }
        .validate()?;
        require_items("instanceIds", &self.instance_ids)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeInstancePassArgs {
    pub admin_pass: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModifyInstanceAttributeArgs {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModifyInstanceDescArgs {
    #[serde(rename = "desc")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetInstanceVncResult {
    pub vnc_url: String,
}

/// Renew a prepaid instance. Purchasing a reservation is always prepaid, so
/// the request carries a `Reservation` rather than a full `Billing`.
#[derive(Debug, Clone)]
pub struct PurchaseReservedArgs {
    pub reservation: Reservation,
    pub related_renew_flag: Option<String>,
    pub client_token: Option<ClientToken>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PurchaseReservedBody {
    pub billing: Billing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_renew_flag: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeToPrepaidArgs {
    /// Reservation length in months.
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_cds: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeToPrepaidResult {
    pub order_id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAddIpArgs {
    pub instance_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_ips: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_private_ip_address_count: Option<u32>,
}

impl BatchAddIpArgs {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require("instanceId", &self.instance_id)?;
        match (&self.private_ips, self.secondary_private_ip_address_count) {
            (Some(ips), _) if !ips.is_empty() => Ok(()),
            (_, Some(count)) if count > 0 => Ok(()),
            _ => Err(ApiError::invalid(
                "one of privateIps or secondaryPrivateIpAddressCount is required",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAddIpResult {
    #[serde(default)]
    pub private_ips: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDelIpArgs {
    pub instance_id: String,
    pub private_ips: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SecurityGroupBindingBody<'a> {
    pub security_group_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeTagsArgs {
    pub change_tags: Vec<TagModel>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBidOrderArgs {
    pub order_id: String,
    #[serde(skip)]
    pub client_token: Option<ClientToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBidOrderResult {
    pub order_id: String,
}

/// One entry of `ListSpec`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceTypeModel {
    #[serde(rename = "type")]
    pub instance_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cpu_count: u32,
    #[serde(default, rename = "memoryCapacityInGB")]
    pub memory_capacity_in_gb: u32,
    #[serde(default, rename = "localDiskSizeInGB")]
    pub local_disk_size_in_gb: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSpecResult {
    pub instance_types: Vec<InstanceTypeModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneModel {
    pub zone_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListZoneResult {
    pub zones: Vec<ZoneModel>,
}
