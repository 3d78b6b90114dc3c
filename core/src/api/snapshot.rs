use crate::client::{decode_json, require, BccClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::page::{decode_page, Page};
use crate::types::{CreateSnapshotArgs, CreateSnapshotResult, GetSnapshotDetailResult, ListSnapshotArgs, SnapshotModel};

const SNAPSHOT: &str = "snapshot";

impl BccClient {
    pub fn build_create_snapshot(&self, args: &CreateSnapshotArgs) -> Result<HttpRequest, ApiError> {
        args.validate()?;
        Ok(self
            .request(HttpMethod::Post, &[SNAPSHOT])
            .client_token(args.client_token.as_ref())
            .json(args)?
            .build())
    }

    pub fn parse_create_snapshot(&self, response: HttpResponse) -> Result<CreateSnapshotResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_list_snapshot(&self, args: &ListSnapshotArgs) -> HttpRequest {
        self.request(HttpMethod::Get, &[SNAPSHOT])
            .param_opt("volumeId", args.volume_id.as_deref())
            .param_opt("marker", args.marker.as_deref())
            .param_opt("maxKeys", args.max_keys)
            .build()
    }

    pub fn parse_list_snapshot(&self, response: HttpResponse) -> Result<Page<SnapshotModel>, ApiError> {
        decode_page(&response, "snapshots")
    }

    pub fn build_get_snapshot_detail(&self, snapshot_id: &str) -> Result<HttpRequest, ApiError> {
        require("snapshotId", snapshot_id)?;
        Ok(self.request(HttpMethod::Get, &[SNAPSHOT, snapshot_id]).build())
    }

    pub fn parse_get_snapshot_detail(&self, response: HttpResponse) -> Result<GetSnapshotDetailResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_delete_snapshot(&self, snapshot_id: &str) -> Result<HttpRequest, ApiError> {
        require("snapshotId", snapshot_id)?;
        Ok(self.request(HttpMethod::Delete, &[SNAPSHOT, snapshot_id]).build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_snapshot_body() {
        let client = BccClient::with_credentials("ak", "sk", "http://localhost:8080").unwrap();
        let mut args = CreateSnapshotArgs::new("v-1", "daily");
        args.description = Some("before upgrade".to_string());
        let req = client.build_create_snapshot(&args).unwrap();
        assert_eq!(
            req.json_body().unwrap(),
            json!({"volumeId": "v-1", "snapshotName": "daily", "desc": "before upgrade"})
        );
        assert!(client.build_delete_snapshot("").is_err());
    }
}
