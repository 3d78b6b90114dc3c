use crate::client::{decode_json, require, BccClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::page::{decode_page, Page};
use crate::types::volume::BillingBody;
use crate::types::{
    AttachVolumeResult, Billing, CreateCdsVolumeArgs, CreateCdsVolumeResult, DeleteCdsVolumeArgs,
    GetVolumeDetailResult, ListCdsVolumeArgs, ModifyCdsVolumeArgs, ModifyChargeTypeCdsVolumeArgs,
    PurchaseReservedCdsVolumeArgs, RenameCdsVolumeArgs, ResizeCdsVolumeArgs, VolumeInstanceArgs, VolumeModel,
};

const VOLUME: &str = "volume";

impl BccClient {
    pub fn build_create_cds_volume(&self, args: &CreateCdsVolumeArgs) -> Result<HttpRequest, ApiError> {
        args.validate()?;
        Ok(self
            .request(HttpMethod::Post, &[VOLUME])
            .client_token(args.client_token.as_ref())
            .json(args)?
            .build())
    }

    pub fn parse_create_cds_volume(&self, response: HttpResponse) -> Result<CreateCdsVolumeResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_list_cds_volume(&self, args: &ListCdsVolumeArgs) -> HttpRequest {
        self.request(HttpMethod::Get, &[VOLUME])
            .param_opt("instanceId", args.instance_id.as_deref())
            .param_opt("zoneName", args.zone_name.as_deref())
            .param_opt("marker", args.marker.as_deref())
            .param_opt("maxKeys", args.max_keys)
            .build()
    }

    pub fn parse_list_cds_volume(&self, response: HttpResponse) -> Result<Page<VolumeModel>, ApiError> {
        decode_page(&response, "volumes")
    }

    pub fn build_get_cds_volume_detail(&self, volume_id: &str) -> Result<HttpRequest, ApiError> {
        require("volumeId", volume_id)?;
        Ok(self.request(HttpMethod::Get, &[VOLUME, volume_id]).build())
    }

    pub fn parse_get_cds_volume_detail(&self, response: HttpResponse) -> Result<GetVolumeDetailResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_attach_cds_volume(&self, volume_id: &str, args: &VolumeInstanceArgs) -> Result<HttpRequest, ApiError> {
        self.volume_instance_action(volume_id, args, "attach")
    }

    pub fn parse_attach_cds_volume(&self, response: HttpResponse) -> Result<AttachVolumeResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_detach_cds_volume(&self, volume_id: &str, args: &VolumeInstanceArgs) -> Result<HttpRequest, ApiError> {
        self.volume_instance_action(volume_id, args, "detach")
    }

    fn volume_instance_action(
        &self,
        volume_id: &str,
        args: &VolumeInstanceArgs,
        action: &str,
    ) -> Result<HttpRequest, ApiError> {
        require("volumeId", volume_id)?;
        require("instanceId", &args.instance_id)?;
        Ok(self
            .request(HttpMethod::Put, &[VOLUME, volume_id])
            .action(action)
            .json(args)?
            .build())
    }

    pub fn build_resize_cds_volume(&self, volume_id: &str, args: &ResizeCdsVolumeArgs) -> Result<HttpRequest, ApiError> {
        require("volumeId", volume_id)?;
        args.validate()?;
        Ok(self
            .request(HttpMethod::Put, &[VOLUME, volume_id])
            .action("resize")
            .client_token(args.client_token.as_ref())
            .json(args)?
            .build())
    }

    pub fn build_purchase_reserved_cds_volume(
        &self,
        volume_id: &str,
        args: &PurchaseReservedCdsVolumeArgs,
    ) -> Result<HttpRequest, ApiError> {
        require("volumeId", volume_id)?;
        args.reservation.validate()?;
        let body = BillingBody {
            billing: Billing::Prepaid(args.reservation.clone()),
        };
        Ok(self
            .request(HttpMethod::Put, &[VOLUME, volume_id])
            .action("purchaseReserved")
            .client_token(args.client_token.as_ref())
            .json(&body)?
            .build())
    }

    pub fn build_rename_cds_volume(&self, volume_id: &str, args: &RenameCdsVolumeArgs) -> Result<HttpRequest, ApiError> {
        require("volumeId", volume_id)?;
        require("name", &args.name)?;
        Ok(self
            .request(HttpMethod::Put, &[VOLUME, volume_id])
            .action("rename")
            .json(args)?
            .build())
    }

    pub fn build_modify_cds_volume(&self, volume_id: &str, args: &ModifyCdsVolumeArgs) -> Result<HttpRequest, ApiError> {
        require("volumeId", volume_id)?;
        args.validate()?;
        Ok(self
            .request(HttpMethod::Put, &[VOLUME, volume_id])
            .action("modify")
            .json(args)?
            .build())
    }

    pub fn build_modify_charge_type_cds_volume(
        &self,
        volume_id: &str,
        args: &ModifyChargeTypeCdsVolumeArgs,
    ) -> Result<HttpRequest, ApiError> {
        require("volumeId", volume_id)?;
        args.billing.validate()?;
        Ok(self
            .request(HttpMethod::Put, &[VOLUME, volume_id])
            .action("modifyChargeType")
            .json(args)?
            .build())
    }

    pub fn build_delete_cds_volume(&self, volume_id: &str) -> Result<HttpRequest, ApiError> {
        require("volumeId", volume_id)?;
        Ok(self.request(HttpMethod::Delete, &[VOLUME, volume_id]).build())
    }

    /// Delete with explicit handling of the volume's snapshots.
    pub fn build_delete_cds_volume_new(&self, volume_id: &str, args: &DeleteCdsVolumeArgs) -> Result<HttpRequest, ApiError> {
        require("volumeId", volume_id)?;
        Ok(self.request(HttpMethod::Post, &[VOLUME, volume_id]).json(args)?.build())
    }
}
