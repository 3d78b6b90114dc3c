//! Multi-step flows composed from build, send, parse and wait.
//!
//! Each flow is a fixed sequence of explicit steps. Nothing is retried; the
//! first failing step returns its error.

use tracing::info;

use crate::client::BccClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{
    AttachVolumeResult, CreateCdsVolumeArgs, CreateCdsVolumeResult, CreateInstanceArgs, CreateInstanceResult,
    InstanceStatus, ResizeCdsVolumeArgs, VolumeInstanceArgs, VolumeStatus,
};
use crate::waiter::WaitPolicy;

impl BccClient {
    /// Create instances and wait until every one of them is `Running`.
    pub fn create_instance_and_wait<T: Transport + ?Sized>(
        &self,
        transport: &T,
        args: &CreateInstanceArgs,
        policy: &WaitPolicy,
    ) -> Result<CreateInstanceResult, ApiError> {
        let request = self.build_create_instance(args)?;
        let created = self.parse_create_instance(self.send(transport, &request)?)?;
        for id in &created.instance_ids {
            self.wait_for_instance(transport, id, &[InstanceStatus::Running], policy)?;
        }
        info!(count = created.instance_ids.len(), "instances running");
        Ok(created)
    }

    /// Create CDS volumes and wait until every one of them is `Available`.
    pub fn create_volume_and_wait<T: Transport + ?Sized>(
        &self,
        transport: &T,
        args: &CreateCdsVolumeArgs,
        policy: &WaitPolicy,
    ) -> Result<CreateCdsVolumeResult, ApiError> {
        let request = self.build_create_cds_volume(args)?;
        let created = self.parse_create_cds_volume(self.send(transport, &request)?)?;
        for id in &created.volume_ids {
            self.wait_for_volume(transport, id, &[VolumeStatus::Available], policy)?;
        }
        info!(count = created.volume_ids.len(), "volumes available");
        Ok(created)
    }

    pub fn attach_volume_and_wait<T: Transport + ?Sized>(
        &self,
        transport: &T,
        volume_id: &str,
        instance_id: &str,
        policy: &WaitPolicy,
    ) -> Result<AttachVolumeResult, ApiError> {
        let request = self.build_attach_cds_volume(volume_id, &VolumeInstanceArgs::new(instance_id))?;
        let attached = self.parse_attach_cds_volume(self.send(transport, &request)?)?;
        self.wait_for_volume(transport, volume_id, &[VolumeStatus::InUse], policy)?;
        Ok(attached)
    }

    pub fn detach_volume_and_wait<T: Transport + ?Sized>(
        &self,
        transport: &T,
        volume_id: &str,
        instance_id: &str,
        policy: &WaitPolicy,
    ) -> Result<(), ApiError> {
        let request = self.build_detach_cds_volume(volume_id, &VolumeInstanceArgs::new(instance_id))?;
        self.parse_empty(self.send(transport, &request)?)?;
        self.wait_for_volume(transport, volume_id, &[VolumeStatus::Available], policy)?;
        Ok(())
    }

    /// Resize a volume and wait for it to leave `Scaling`. An attached
    /// volume settles back to `InUse`, a detached one to `Available`.
    pub fn resize_volume_and_wait<T: Transport + ?Sized>(
        &self,
        transport: &T,
        volume_id: &str,
        args: &ResizeCdsVolumeArgs,
        policy: &WaitPolicy,
    ) -> Result<VolumeStatus, ApiError> {
        let request = self.build_resize_cds_volume(volume_id, args)?;
        self.parse_empty(self.send(transport, &request)?)?;
        self.wait_for_volume(
            transport,
            volume_id,
            &[VolumeStatus::Available, VolumeStatus::InUse],
            policy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};
    use crate::types::Billing;
    use std::cell::RefCell;
    use std::time::Duration;

    fn fast() -> WaitPolicy {
        WaitPolicy::new(Duration::from_millis(1), Duration::from_millis(200))
    }

    #[test]
    fn create_instance_then_poll_until_running() {
        let log = RefCell::new(Vec::new());
        let transport = |req: &HttpRequest| -> Result<HttpResponse, ApiError> {
            log.borrow_mut().push(req.method);
            let body = match req.method {
                HttpMethod::Post => r#"{"instanceIds":["i-1"]}"#.to_string(),
                _ if log.borrow().len() < 3 => r#"{"instance":{"id":"i-1","status":"Creating"}}"#.to_string(),
                _ => r#"{"instance":{"id":"i-1","status":"Running"}}"#.to_string(),
            };
            Ok(HttpResponse::new(200, body))
        };
        let client = BccClient::with_credentials("ak", "sk", "localhost").unwrap();
        let args = CreateInstanceArgs::new("m-1", Billing::postpaid(), 1, 1);
        let created = client.create_instance_and_wait(&transport, &args, &fast()).unwrap();

        assert_eq!(created.instance_ids, vec!["i-1".to_string()]);
        assert_eq!(
            *log.borrow(),
            vec![HttpMethod::Post, HttpMethod::Get, HttpMethod::Get]
        );
    }

    #[test]
    fn failed_step_stops_the_flow() {
        let calls = RefCell::new(0);
        let transport = |_: &HttpRequest| -> Result<HttpResponse, ApiError> {
            *calls.borrow_mut() += 1;
            Ok(HttpResponse::new(
                400,
                r#"{"code":"Volume.InstanceNotFound","message":"no instance","requestId":"r"}"#,
            ))
        };
        let client = BccClient::with_credentials("ak", "sk", "localhost").unwrap();
        let err = client
            .attach_volume_and_wait(&transport, "v-1", "i-404", &fast())
            .unwrap_err();
        assert_eq!(err.code(), Some("Volume.InstanceNotFound"));
        assert_eq!(*calls.borrow(), 1);
    }
}
