use crate::client::{decode_json, require, require_items, BccClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::page::{decode_page, Page};
use crate::types::{AspModel, AspVolumesArgs, CreateAspArgs, CreateAspResult, GetAspResult, ListAspArgs};

const ASP: &str = "asp";

impl BccClient {
    pub fn build_create_auto_snapshot_policy(&self, args: &CreateAspArgs) -> Result<HttpRequest, ApiError> {
        args.validate()?;
        Ok(self
            .request(HttpMethod::Post, &[ASP])
            .client_token(args.client_token.as_ref())
            .json(args)?
            .build())
    }

    pub fn parse_create_auto_snapshot_policy(&self, response: HttpResponse) -> Result<CreateAspResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_attach_auto_snapshot_policy(&self, asp_id: &str, args: &AspVolumesArgs) -> Result<HttpRequest, ApiError> {
        self.asp_volumes(asp_id, args, "attach")
    }

    pub fn build_detach_auto_snapshot_policy(&self, asp_id: &str, args: &AspVolumesArgs) -> Result<HttpRequest, ApiError> {
        self.asp_volumes(asp_id, args, "detach")
    }

    fn asp_volumes(&self, asp_id: &str, args: &AspVolumesArgs, action: &str) -> Result<HttpRequest, ApiError> {
        require("aspId", asp_id)?;
        require_items("volumeIds", &args.volume_ids)?;
        Ok(self
            .request(HttpMethod::Put, &[ASP, asp_id])
            .action(action)
            .json(args)?
            .build())
    }

    pub fn build_list_auto_snapshot_policy(&self, args: &ListAspArgs) -> HttpRequest {
        self.request(HttpMethod::Get, &[ASP])
            .param_opt("aspName", args.asp_name.as_deref())
            .param_opt("volumeName", args.volume_name.as_deref())
            .param_opt("marker", args.marker.as_deref())
            .param_opt("maxKeys", args.max_keys)
            .build()
    }

    /// The provider spells the list key `autoSnapshotPolicys`.
    pub fn parse_list_auto_snapshot_policy(&self, response: HttpResponse) -> Result<Page<AspModel>, ApiError> {
        decode_page(&response, "autoSnapshotPolicys")
    }

    pub fn build_get_auto_snapshot_policy(&self, asp_id: &str) -> Result<HttpRequest, ApiError> {
        require("aspId", asp_id)?;
        Ok(self.request(HttpMethod::Get, &[ASP, asp_id]).build())
    }

    pub fn parse_get_auto_snapshot_policy(&self, response: HttpResponse) -> Result<GetAspResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_delete_auto_snapshot_policy(&self, asp_id: &str) -> Result<HttpRequest, ApiError> {
        require("aspId", asp_id)?;
        Ok(self.request(HttpMethod::Delete, &[ASP, asp_id]).build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BccClient {
        BccClient::with_credentials("ak", "sk", "http://localhost:8080").unwrap()
    }

    #[test]
    fn attach_requires_volumes() {
        let c = client();
        assert!(c
            .build_attach_auto_snapshot_policy("asp-1", &AspVolumesArgs { volume_ids: vec![] })
            .is_err());
        let req = c
            .build_detach_auto_snapshot_policy(
                "asp-1",
                &AspVolumesArgs {
                    volume_ids: vec!["v-1".to_string()],
                },
            )
            .unwrap();
        assert_eq!(req.url(), "http://localhost:8080/v2/asp/asp-1?detach");
    }

    #[test]
    fn list_uses_provider_spelling() {
        let resp = HttpResponse::new(
            200,
            r#"{"isTruncated":false,"autoSnapshotPolicys":[{"id":"asp-1","name":"nightly","timePoints":["2"]}]}"#,
        );
        let page = client().parse_list_auto_snapshot_policy(resp).unwrap();
        assert_eq!(page.items[0].time_points, vec!["2".to_string()]);
    }
}
