use crate::client::{decode_json, require, BccClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::page::{decode_page, Page};
use crate::types::{
    CreateSecurityGroupArgs, CreateSecurityGroupResult, ListSecurityGroupArgs, SecurityGroupModel,
    SecurityGroupRuleArgs,
};

const SECURITY_GROUP: &str = "securityGroup";

impl BccClient {
    pub fn build_create_security_group(&self, args: &CreateSecurityGroupArgs) -> Result<HttpRequest, ApiError> {
        args.validate()?;
        Ok(self
            .request(HttpMethod::Post, &[SECURITY_GROUP])
            .client_token(args.client_token.as_ref())
            .json(args)?
            .build())
    }

    pub fn parse_create_security_group(&self, response: HttpResponse) -> Result<CreateSecurityGroupResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_list_security_group(&self, args: &ListSecurityGroupArgs) -> HttpRequest {
        self.request(HttpMethod::Get, &[SECURITY_GROUP])
            .param_opt("instanceId", args.instance_id.as_deref())
            .param_opt("vpcId", args.vpc_id.as_deref())
            .param_opt("marker", args.marker.as_deref())
            .param_opt("maxKeys", args.max_keys)
            .build()
    }

    pub fn parse_list_security_group(&self, response: HttpResponse) -> Result<Page<SecurityGroupModel>, ApiError> {
        decode_page(&response, "securityGroups")
    }

    pub fn build_authorize_security_group_rule(
        &self,
        security_group_id: &str,
        args: &SecurityGroupRuleArgs,
    ) -> Result<HttpRequest, ApiError> {
        self.security_group_rule(security_group_id, args, "authorizeRule")
    }

    pub fn build_revoke_security_group_rule(
        &self,
        security_group_id: &str,
        args: &SecurityGroupRuleArgs,
    ) -> Result<HttpRequest, ApiError> {
        self.security_group_rule(security_group_id, args, "revokeRule")
    }

    fn security_group_rule(
        &self,
        security_group_id: &str,
        args: &SecurityGroupRuleArgs,
        action: &str,
    ) -> Result<HttpRequest, ApiError> {
        require("securityGroupId", security_group_id)?;
        Ok(self
            .request(HttpMethod::Put, &[SECURITY_GROUP, security_group_id])
            .action(action)
            .json(args)?
            .build())
    }

    pub fn build_delete_security_group(&self, security_group_id: &str) -> Result<HttpRequest, ApiError> {
        require("securityGroupId", security_group_id)?;
        Ok(self.request(HttpMethod::Delete, &[SECURITY_GROUP, security_group_id]).build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, SecurityGroupRuleModel};
    use serde_json::json;

    fn client() -> BccClient {
        BccClient::with_credentials("ak", "sk", "http://localhost:8080").unwrap()
    }

    #[test]
    fn authorize_rule_wraps_rule() {
        let mut rule = SecurityGroupRuleModel::new(Direction::Egress);
        rule.dest_ip = Some("0.0.0.0/0".to_string());
        let req = client()
            .build_authorize_security_group_rule("g-1", &SecurityGroupRuleArgs { rule })
            .unwrap();
        assert_eq!(req.url(), "http://localhost:8080/v2/securityGroup/g-1?authorizeRule");
        assert_eq!(
            req.json_body().unwrap(),
            json!({"rule": {"direction": "egress", "destIp": "0.0.0.0/0"}})
        );
    }

    #[test]
    fn list_decodes_security_groups_key() {
        let resp = HttpResponse::new(
            200,
            r#"{"isTruncated":false,"securityGroups":[{"id":"g-1","name":"web","rules":[{"direction":"ingress"}]}]}"#,
        );
        let page = client().parse_list_security_group(resp).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].rules[0].direction, Direction::Ingress);
    }
}
