use crate::client::{decode_json, require, require_items, require_positive, BccClient, RequestBuilder};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::page::{decode_page, Page};
use crate::types::instance::{PurchaseReservedBody, RebootInstanceBody, SecurityGroupBindingBody, StopInstanceBody};
use crate::types::{
    BatchAddIpArgs, BatchAddIpResult, BatchDelIpArgs, BatchRebuildInstanceArgs, Billing, CancelBidOrderArgs,
    CancelBidOrderResult, ChangeInstancePassArgs, ChangeTagsArgs, ChangeToPrepaidArgs, ChangeToPrepaidResult,
    CreateInstanceArgs, CreateInstanceBySpecArgs, CreateInstanceResult, GetInstanceDetailResult, GetInstanceVncResult,
    InstanceModel, ListInstanceArgs, ListSpecResult, ListZoneResult, ModifyInstanceAttributeArgs,
    ModifyInstanceDescArgs, PaymentTiming, PurchaseReservedArgs, RebuildInstanceArgs, ResizeInstanceArgs,
    ResizeInstanceBySpecArgs,
};

const INSTANCE: &str = "instance";

impl BccClient {
    pub fn build_create_instance(&self, args: &CreateInstanceArgs) -> Result<HttpRequest, ApiError> {
        args.validate()?;
        Ok(self
            .request(HttpMethod::Post, &[INSTANCE])
            .client_token(args.client_token.as_ref())
            .json(args)?
            .build())
    }

    pub fn parse_create_instance(&self, response: HttpResponse) -> Result<CreateInstanceResult, ApiError> {
        decode_json(&response)
    }

    /// Same wire call as `build_create_instance`, restricted to bidding billing.
    pub fn build_create_bid_instance(&self, args: &CreateInstanceArgs) -> Result<HttpRequest, ApiError> {
        if args.billing.payment_timing() != PaymentTiming::Bidding {
            return Err(ApiError::invalid("bid instances require bidding billing"));
        }
        self.build_create_instance(args)
    }

    pub fn build_create_instance_by_spec(&self, args: &CreateInstanceBySpecArgs) -> Result<HttpRequest, ApiError> {
        args.validate()?;
        Ok(self
            .request(HttpMethod::Post, &["instanceBySpec"])
            .client_token(args.client_token.as_ref())
            .json(args)?
            .build())
    }

    pub fn parse_create_instance_by_spec(&self, response: HttpResponse) -> Result<CreateInstanceResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_list_instances(&self, args: &ListInstanceArgs) -> HttpRequest {
        list_query(self.request(HttpMethod::Get, &[INSTANCE]), args).build()
    }

    pub fn parse_list_instances(&self, response: HttpResponse) -> Result<Page<InstanceModel>, ApiError> {
        decode_page(&response, "instances")
    }

    /// Instances stopped without charge.
    pub fn build_get_instance_no_charge_list(&self, args: &ListInstanceArgs) -> HttpRequest {
        list_query(self.request(HttpMethod::Get, &[INSTANCE, "noChargeList"]), args).build()
    }

    pub fn parse_get_instance_no_charge_list(&self, response: HttpResponse) -> Result<Page<InstanceModel>, ApiError> {
        decode_page(&response, "instances")
    }

    pub fn build_get_instance_detail(&self, instance_id: &str) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        Ok(self.request(HttpMethod::Get, &[INSTANCE, instance_id]).build())
    }

    pub fn parse_get_instance_detail(&self, response: HttpResponse) -> Result<GetInstanceDetailResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_delete_instance(&self, instance_id: &str) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        Ok(self.request(HttpMethod::Delete, &[INSTANCE, instance_id]).build())
    }

    pub fn build_resize_instance(&self, instance_id: &str, args: &ResizeInstanceArgs) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        args.validate()?;
        Ok(self
            .request(HttpMethod::Put, &[INSTANCE, instance_id])
            .action("resize")
            .client_token(args.client_token.as_ref())
            .json(args)?
            .build())
    }

    pub fn build_resize_instance_by_spec(
        &self,
        instance_id: &str,
        args: &ResizeInstanceBySpecArgs,
    ) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        require("spec", &args.spec)?;
        Ok(self
            .request(HttpMethod::Put, &[INSTANCE, instance_id])
            .action("resizeBySpec")
            .client_token(args.client_token.as_ref())
            .json(args)?
            .build())
    }

    pub fn build_stop_instance(&self, instance_id: &str, force_stop: bool) -> Result<HttpRequest, ApiError> {
        self.stop_instance(instance_id, force_stop, None)
    }

    pub fn build_stop_instance_with_no_charge(
        &self,
        instance_id: &str,
        force_stop: bool,
        stop_with_no_charge: bool,
    ) -> Result<HttpRequest, ApiError> {
        self.stop_instance(instance_id, force_stop, Some(stop_with_no_charge))
    }

    fn stop_instance(
        &self,
        instance_id: &str,
        force_stop: bool,
        stop_with_no_charge: Option<bool>,
    ) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        let body = StopInstanceBody {
            force_stop,
            stop_with_no_charge,
        };
        Ok(self
            .request(HttpMethod::Put, &[INSTANCE, instance_id])
            .action("stop")
            .json(&body)?
            .build())
    }

    pub fn build_start_instance(&self, instance_id: &str) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        Ok(self.request(HttpMethod::Put, &[INSTANCE, instance_id]).action("start").build())
    }

    pub fn build_reboot_instance(&self, instance_id: &str, force_stop: bool) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        Ok(self
            .request(HttpMethod::Put, &[INSTANCE, instance_id])
            .action("reboot")
            .json(&RebootInstanceBody { force_stop })?
            .build())
    }

    pub fn build_rebuild_instance(&self, instance_id: &str, args: &RebuildInstanceArgs) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        args.validate()?;
        Ok(self
            .request(HttpMethod::Put, &[INSTANCE, instance_id])
            .action("rebuild")
            .json(args)?
            .build())
    }

    pub fn build_batch_rebuild_instances(&self, args: &BatchRebuildInstanceArgs) -> Result<HttpRequest, ApiError> {
        args.validate()?;
        Ok(self.request(HttpMethod::Put, &[INSTANCE, "rebuild"]).json(args)?.build())
    }

    /// The password travels as given; encrypting it is the transport's job.
    pub fn build_change_instance_pass(
        &self,
        instance_id: &str,
        args: &ChangeInstancePassArgs,
    ) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        require("adminPass", &args.admin_pass)?;
        Ok(self
            .request(HttpMethod::Put, &[INSTANCE, instance_id])
            .action("changePass")
            .json(args)?
            .build())
    }

    pub fn build_modify_instance_attribute(
        &self,
        instance_id: &str,
        args: &ModifyInstanceAttributeArgs,
    ) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        require("name", &args.name)?;
        Ok(self
            .request(HttpMethod::Put, &[INSTANCE, instance_id])
            .action("modifyAttribute")
            .json(args)?
            .build())
    }

    pub fn build_modify_instance_desc(
        &self,
        instance_id: &str,
        args: &ModifyInstanceDescArgs,
    ) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        Ok(self
            .request(HttpMethod::Put, &[INSTANCE, instance_id])
            .action("modifyDesc")
            .json(args)?
            .build())
    }

    pub fn build_get_instance_vnc(&self, instance_id: &str) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        Ok(self.request(HttpMethod::Get, &[INSTANCE, instance_id, "vnc"]).build())
    }

    pub fn parse_get_instance_vnc(&self, response: HttpResponse) -> Result<GetInstanceVncResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_instance_purchase_reserved(
        &self,
        instance_id: &str,
        args: &PurchaseReservedArgs,
    ) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        args.reservation.validate()?;
        let body = PurchaseReservedBody {
            billing: Billing::Prepaid(args.reservation.clone()),
            related_renew_flag: args.related_renew_flag.clone(),
        };
        Ok(self
            .request(HttpMethod::Put, &[INSTANCE, instance_id])
            .action("purchaseReserved")
            .client_token(args.client_token.as_ref())
            .json(&body)?
            .build())
    }

    pub fn build_change_to_prepaid(&self, instance_id: &str, args: &ChangeToPrepaidArgs) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        require_positive("duration", args.duration)?;
        Ok(self
            .request(HttpMethod::Post, &[INSTANCE, instance_id])
            .action("toPrepay")
            .json(args)?
            .build())
    }

    pub fn parse_change_to_prepaid(&self, response: HttpResponse) -> Result<ChangeToPrepaidResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_batch_add_ip(&self, args: &BatchAddIpArgs) -> Result<HttpRequest, ApiError> {
        args.validate()?;
        Ok(self.request(HttpMethod::Put, &[INSTANCE, "batchAddIp"]).json(args)?.build())
    }

    pub fn parse_batch_add_ip(&self, response: HttpResponse) -> Result<BatchAddIpResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_batch_del_ip(&self, args: &BatchDelIpArgs) -> Result<HttpRequest, ApiError> {
        require("instanceId", &args.instance_id)?;
        require_items("privateIps", &args.private_ips)?;
        Ok(self.request(HttpMethod::Put, &[INSTANCE, "batchDelIp"]).json(args)?.build())
    }

    pub fn build_bind_security_group(&self, instance_id: &str, security_group_id: &str) -> Result<HttpRequest, ApiError> {
        self.security_group_binding(instance_id, security_group_id, "bind")
    }

    pub fn build_unbind_security_group(
        &self,
        instance_id: &str,
        security_group_id: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.security_group_binding(instance_id, security_group_id, "unbind")
    }

    fn security_group_binding(
        &self,
        instance_id: &str,
        security_group_id: &str,
        action: &str,
    ) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        require("securityGroupId", security_group_id)?;
        Ok(self
            .request(HttpMethod::Put, &[INSTANCE, instance_id])
            .action(action)
            .json(&SecurityGroupBindingBody { security_group_id })?
            .build())
    }

    pub fn build_bind_instance_to_tags(&self, instance_id: &str, args: &ChangeTagsArgs) -> Result<HttpRequest, ApiError> {
        self.tag_binding(instance_id, args, "bind")
    }

    pub fn build_unbind_instance_from_tags(
        &self,
        instance_id: &str,
        args: &ChangeTagsArgs,
    ) -> Result<HttpRequest, ApiError> {
        self.tag_binding(instance_id, args, "unbind")
    }

    fn tag_binding(&self, instance_id: &str, args: &ChangeTagsArgs, action: &str) -> Result<HttpRequest, ApiError> {
        require("instanceId", instance_id)?;
        require_items("changeTags", &args.change_tags)?;
        Ok(self
            .request(HttpMethod::Put, &[INSTANCE, instance_id, "tag"])
            .action(action)
            .json(args)?
            .build())
    }

    pub fn build_cancel_bid_order(&self, args: &CancelBidOrderArgs) -> Result<HttpRequest, ApiError> {
        require("orderId", &args.order_id)?;
        Ok(self
            .request(HttpMethod::Post, &[INSTANCE, "cancelBidOrder"])
            .client_token(args.client_token.as_ref())
            .json(args)?
            .build())
    }

    pub fn parse_cancel_bid_order(&self, response: HttpResponse) -> Result<CancelBidOrderResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_list_spec(&self) -> HttpRequest {
        self.request(HttpMethod::Get, &[INSTANCE, "spec"]).build()
    }

    pub fn parse_list_spec(&self, response: HttpResponse) -> Result<ListSpecResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_list_zone(&self) -> HttpRequest {
        self.request(HttpMethod::Get, &["zone"]).build()
    }

    pub fn parse_list_zone(&self, response: HttpResponse) -> Result<ListZoneResult, ApiError> {
        decode_json(&response)
    }
}

fn list_query(builder: RequestBuilder, args: &ListInstanceArgs) -> RequestBuilder {
    builder
        .param_opt("marker", args.marker.as_deref())
        .param_opt("maxKeys", args.max_keys)
        .param_opt("internalIp", args.internal_ip.as_deref())
        .param_opt("dedicatedHostId", args.dedicated_host_id.as_deref())
        .param_opt("zoneName", args.zone_name.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientToken, InstanceStatus, Reservation, ReservationTimeUnit, TagModel};

    fn client() -> BccClient {
        BccClient::with_credentials("ak", "sk", "http://localhost:8080").unwrap()
    }

    #[test]
    fn create_instance_postpaid_body() {
        let mut args = CreateInstanceArgs::new("m-1", Billing::postpaid(), 1, 4);
        args.client_token = Some(ClientToken::new("tok"));
        let req = client().build_create_instance(&args).unwrap();

        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url(), "http://localhost:8080/v2/instance?clientToken=tok");
        let body = req.json_body().unwrap();
        assert_eq!(body["cpuCount"], 1);
        assert_eq!(body["memoryCapacityInGB"], 4);
        assert_eq!(body["billing"], serde_json::json!({"paymentTiming": "Postpaid"}));
        assert!(body.get("name").is_none());
        assert!(body.get("clientToken").is_none());
    }

    #[test]
    fn create_instance_rejects_zero_cpu_before_building() {
        let args = CreateInstanceArgs::new("m-1", Billing::postpaid(), 0, 4);
        let err = client().build_create_instance(&args).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn bid_instance_requires_bidding() {
        let args = CreateInstanceArgs::new("m-1", Billing::postpaid(), 1, 1);
        assert!(client().build_create_bid_instance(&args).is_err());

        let args = CreateInstanceArgs::new("m-1", Billing::bidding(), 1, 1);
        let req = client().build_create_bid_instance(&args).unwrap();
        assert_eq!(req.json_body().unwrap()["billing"]["paymentTiming"], "bidding");
    }

    #[test]
    fn resize_uses_bare_action_key() {
        let req = client()
            .build_resize_instance("i-1", &ResizeInstanceArgs::new(2, 8))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url(), "http://localhost:8080/v2/instance/i-1?resize");
        assert_eq!(
            req.json_body().unwrap(),
            serde_json::json!({"cpuCount": 2, "memoryCapacityInGB": 8})
        );
    }

    #[test]
    fn empty_instance_id_is_rejected() {
        let c = client();
        assert!(c.build_get_instance_detail("").is_err());
        assert!(c.build_delete_instance(" ").is_err());
        assert!(c.build_start_instance("").is_err());
        assert!(c.build_bind_security_group("i-1", "").is_err());
    }

    #[test]
    fn stop_with_no_charge_adds_flag() {
        let c = client();
        let plain = c.build_stop_instance("i-1", true).unwrap();
        assert_eq!(plain.json_body().unwrap(), serde_json::json!({"forceStop": true}));

        let no_charge = c.build_stop_instance_with_no_charge("i-1", false, true).unwrap();
        assert_eq!(
            no_charge.json_body().unwrap(),
            serde_json::json!({"forceStop": false, "stopWithNoCharge": true})
        );
        assert_eq!(no_charge.query_param("stop"), Some(None));
    }

    #[test]
    fn purchase_reserved_sends_prepaid_billing() {
        let args = PurchaseReservedArgs {
            reservation: Reservation::new(1, ReservationTimeUnit::Year).unwrap(),
            related_renew_flag: None,
            client_token: None,
        };
        let req = client().build_instance_purchase_reserved("i-1", &args).unwrap();
        assert_eq!(
            req.json_body().unwrap(),
            serde_json::json!({"billing": {
                "paymentTiming": "Prepaid",
                "reservation": {"reservationLength": 1, "reservationTimeUnit": "Year"}
            }})
        );
    }

    #[test]
    fn list_query_only_carries_set_filters() {
        let args = ListInstanceArgs {
            marker: Some("i-5".to_string()),
            max_keys: Some(10),
            ..Default::default()
        };
        let req = client().build_list_instances(&args);
        assert_eq!(req.url(), "http://localhost:8080/v2/instance?marker=i-5&maxKeys=10");
        assert!(req.body.is_none());
    }

    #[test]
    fn tags_go_to_tag_sub_path() {
        let args = ChangeTagsArgs {
            change_tags: vec![TagModel::new("env", "dev")],
        };
        let req = client().build_bind_instance_to_tags("i-1", &args).unwrap();
        assert_eq!(req.url(), "http://localhost:8080/v2/instance/i-1/tag?bind");
        assert!(client()
            .build_unbind_instance_from_tags("i-1", &ChangeTagsArgs { change_tags: vec![] })
            .is_err());
    }

    #[test]
    fn parse_detail_requires_status() {
        let c = client();
        let ok = c
            .parse_get_instance_detail(HttpResponse::new(
                200,
                r#"{"instance":{"id":"i-1","status":"Running","extra":1}}"#,
            ))
            .unwrap();
        assert_eq!(ok.instance.status, InstanceStatus::Running);

        let err = c
            .parse_get_instance_detail(HttpResponse::new(200, r#"{"instance":{"id":"i-1"}}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse { .. }));
    }

    #[test]
    fn parse_create_missing_ids_is_malformed() {
        let err = client()
            .parse_create_instance(HttpResponse::new(200, r#"{"orderId":"o-1"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse { .. }));
    }
}
