use crate::client::{decode_json, require, require_items, BccClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::page::{decode_page, Page};
use crate::types::image::CreateImageBody;
use crate::types::{
    CreateImageArgs, CreateImageResult, GetImageDetailResult, GetImageOsArgs, GetImageOsResult,
    GetImageSharedUserResult, ImageModel, ListImageArgs, RemoteCopyImageArgs, SharedUser,
};

const IMAGE: &str = "image";

impl BccClient {
    pub fn build_create_image(&self, args: &CreateImageArgs) -> Result<HttpRequest, ApiError> {
        args.validate()?;
        Ok(self
            .request(HttpMethod::Post, &[IMAGE])
            .client_token(args.client_token.as_ref())
            .json(&CreateImageBody::from(args))?
            .build())
    }

    pub fn parse_create_image(&self, response: HttpResponse) -> Result<CreateImageResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_list_image(&self, args: &ListImageArgs) -> HttpRequest {
        self.request(HttpMethod::Get, &[IMAGE])
            .param_opt("imageType", args.image_type.map(|t| t.as_str()))
            .param_opt("marker", args.marker.as_deref())
            .param_opt("maxKeys", args.max_keys)
            .build()
    }

    pub fn parse_list_image(&self, response: HttpResponse) -> Result<Page<ImageModel>, ApiError> {
        decode_page(&response, "images")
    }

    pub fn build_get_image_detail(&self, image_id: &str) -> Result<HttpRequest, ApiError> {
        require("imageId", image_id)?;
        Ok(self.request(HttpMethod::Get, &[IMAGE, image_id]).build())
    }

    pub fn parse_get_image_detail(&self, response: HttpResponse) -> Result<GetImageDetailResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_delete_image(&self, image_id: &str) -> Result<HttpRequest, ApiError> {
        require("imageId", image_id)?;
        Ok(self.request(HttpMethod::Delete, &[IMAGE, image_id]).build())
    }

    pub fn build_remote_copy_image(&self, image_id: &str, args: &RemoteCopyImageArgs) -> Result<HttpRequest, ApiError> {
        require("imageId", image_id)?;
        args.validate()?;
        Ok(self
            .request(HttpMethod::Post, &[IMAGE, image_id])
            .action("remoteCopy")
            .json(args)?
            .build())
    }

    pub fn build_cancel_remote_copy_image(&self, image_id: &str) -> Result<HttpRequest, ApiError> {
        require("imageId", image_id)?;
        Ok(self
            .request(HttpMethod::Post, &[IMAGE, image_id])
            .action("cancelRemoteCopy")
            .build())
    }

    pub fn build_share_image(&self, image_id: &str, user: &SharedUser) -> Result<HttpRequest, ApiError> {
        self.image_sharing(image_id, user, "share")
    }

    pub fn build_unshare_image(&self, image_id: &str, user: &SharedUser) -> Result<HttpRequest, ApiError> {
        self.image_sharing(image_id, user, "unshare")
    }

    fn image_sharing(&self, image_id: &str, user: &SharedUser, action: &str) -> Result<HttpRequest, ApiError> {
        require("imageId", image_id)?;
        user.validate()?;
        Ok(self
            .request(HttpMethod::Post, &[IMAGE, image_id])
            .action(action)
            .json(user)?
            .build())
    }

    pub fn build_get_image_shared_user(&self, image_id: &str) -> Result<HttpRequest, ApiError> {
        require("imageId", image_id)?;
        Ok(self.request(HttpMethod::Get, &[IMAGE, image_id, "sharedUsers"]).build())
    }

    pub fn parse_get_image_shared_user(&self, response: HttpResponse) -> Result<GetImageSharedUserResult, ApiError> {
        decode_json(&response)
    }

    pub fn build_get_image_os(&self, args: &GetImageOsArgs) -> Result<HttpRequest, ApiError> {
        require_items("instanceIds", &args.instance_ids)?;
        Ok(self.request(HttpMethod::Post, &[IMAGE, "os"]).json(args)?.build())
    }

    pub fn parse_get_image_os(&self, response: HttpResponse) -> Result<GetImageOsResult, ApiError> {
        decode_json(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageSource, ImageType};
    use serde_json::json;

    fn client() -> BccClient {
        BccClient::with_credentials("ak", "sk", "http://localhost:8080").unwrap()
    }

    #[test]
    fn create_from_instance() {
        let args = CreateImageArgs {
            image_name: "golden".to_string(),
            source: ImageSource::Instance("i-1".to_string()),
            client_token: None,
        };
        let req = client().build_create_image(&args).unwrap();
        assert_eq!(req.json_body().unwrap(), json!({"imageName": "golden", "instanceId": "i-1"}));
    }

    #[test]
    fn create_rejects_blank_source_id() {
        let args = CreateImageArgs {
            image_name: "golden".to_string(),
            source: ImageSource::Snapshot(String::new()),
            client_token: None,
        };
        assert!(client().build_create_image(&args).is_err());
    }

    #[test]
    fn list_filters_by_type() {
        let args = ListImageArgs {
            image_type: Some(ImageType::Custom),
            ..Default::default()
        };
        let req = client().build_list_image(&args);
        assert_eq!(req.url(), "http://localhost:8080/v2/image?imageType=Custom");
    }

    #[test]
    fn remote_copy_needs_a_region() {
        let args = RemoteCopyImageArgs {
            name: None,
            dest_region: vec![],
        };
        assert!(client().build_remote_copy_image("m-1", &args).is_err());
    }

    #[test]
    fn sharing_actions() {
        let c = client();
        let share = c.build_share_image("m-1", &SharedUser::by_id("acc")).unwrap();
        assert_eq!(share.url(), "http://localhost:8080/v2/image/m-1?share");
        let unshare = c.build_unshare_image("m-1", &SharedUser::by_id("acc")).unwrap();
        assert_eq!(unshare.query_param("unshare"), Some(None));
        assert!(c.build_share_image("m-1", &SharedUser::default()).is_err());
    }

    #[test]
    fn parse_os_info() {
        let resp = HttpResponse::new(200, r#"{"osInfo":[{"instanceId":"i-1","osName":"Ubuntu"}]}"#);
        let result = client().parse_get_image_os(resp).unwrap();
        assert_eq!(result.os_info[0].os_name.as_deref(), Some("Ubuntu"));
    }
}
