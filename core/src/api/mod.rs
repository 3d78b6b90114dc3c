//! Per-resource `build_*` / `parse_*` pairs on `BccClient`.
//!
//! Every builder validates its input and returns `ApiError::InvalidArgument`
//! before any request exists. Operations whose result is `()` share
//! `BccClient::parse_empty`.

mod asp;
mod deploy_set;
mod image;
mod instance;
mod security_group;
mod snapshot;
mod volume;

use crate::client::{decode_empty, BccClient};
use crate::error::ApiError;
use crate::http::HttpResponse;

impl BccClient {
    /// Parse the response of any action whose result is `()`.
    pub fn parse_empty(&self, response: HttpResponse) -> Result<(), ApiError> {
        decode_empty(&response)
    }
}
