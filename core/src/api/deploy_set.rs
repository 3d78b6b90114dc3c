use crate::client::{decode_json, require, BccClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateDeploySetArgs, CreateDeploySetResult, ListDeploySetsResult, ModifyDeploySetArgs};

const INSTANCE: &str = "instance";
const DEPLOY_SET: &str = "deployset";

impl BccClient {
    pub fn build_create_deploy_set(&self, args: &CreateDeploySetArgs) -> Result<HttpRequest, ApiError> {
        Ok(self
            .request(HttpMethod::Post, &[INSTANCE, DEPLOY_SET, "create"])
            .client_token(args.client_token.as_ref())
            .json(args)?
            .build())
    }

    pub fn parse_create_deploy_set(&self, response: HttpResponse) -> Result<CreateDeploySetResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_list_deploy_sets(&self) -> HttpRequest {
        self.request(HttpMethod::Get, &[INSTANCE, DEPLOY_SET, "list"]).build()
    }

    pub fn parse_list_deploy_sets(&self, response: HttpResponse) -> Result<ListDeploySetsResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_modify_deploy_set(&self, deploy_set_id: &str, args: &ModifyDeploySetArgs) -> Result<HttpRequest, ApiError> {
        require("deploySetId", deploy_set_id)?;
        args.validate()?;
        Ok(self
            .request(HttpMethod::Put, &[INSTANCE, DEPLOY_SET, deploy_set_id, "modifyAttribute"])
            .json(args)?
            .build())
    }

    pub fn build_delete_deploy_set(&self, deploy_set_id: &str) -> Result<HttpRequest, ApiError> {
        require("deploySetId", deploy_set_id)?;
        Ok(self
            .request(HttpMethod::Delete, &[INSTANCE, DEPLOY_SET, deploy_set_id])
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deploy_set_paths() {
        let client = BccClient::with_credentials("ak", "sk", "http://localhost:8080").unwrap();
        assert_eq!(
            client.build_list_deploy_sets().path,
            "http://localhost:8080/v2/instance/deployset/list"
        );
        let args = ModifyDeploySetArgs {
            name: Some("renamed".to_string()),
            description: None,
        };
        let req = client.build_modify_deploy_set("dset-1", &args).unwrap();
        assert_eq!(req.path, "http://localhost:8080/v2/instance/deployset/dset-1/modifyAttribute");
        assert!(client
            .build_modify_deploy_set("dset-1", &ModifyDeploySetArgs::default())
            .is_err());
    }
}
