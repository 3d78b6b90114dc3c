//! Blocking status polling for asynchronous provider operations.
//!
//! Create, attach, resize and similar calls return as soon as the provider
//! accepts them; the resource then moves through intermediate states. The
//! helpers here re-read a resource's status until it reaches one of the
//! requested states or the deadline passes.

use std::fmt;
use std::thread::sleep;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::client::BccClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{InstanceStatus, VolumeStatus};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// How often and for how long to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl WaitPolicy {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self { poll_interval, timeout }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT)
    }
}

/// A provider status enum that can be reported in logs and timeouts.
pub trait ResourceStatus: Copy + PartialEq + fmt::Debug {
    fn as_str(self) -> &'static str;
}

impl ResourceStatus for InstanceStatus {
    fn as_str(self) -> &'static str {
        InstanceStatus::as_str(self)
    }
}

impl ResourceStatus for VolumeStatus {
    fn as_str(self) -> &'static str {
        VolumeStatus::as_str(self)
    }
}

/// Reads the current status of one kind of resource.
pub trait StatusProbe {
    type Status: ResourceStatus;

    /// Resource kind used in logs and `ApiError::Timeout`.
    fn resource(&self) -> &'static str;

    fn status(&self, id: &str) -> Result<Self::Status, ApiError>;
}

/// Probes instances through `GetInstanceDetail`.
pub struct InstanceProbe<'a, T: ?Sized> {
    client: &'a BccClient,
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> InstanceProbe<'a, T> {
    pub fn new(client: &'a BccClient, transport: &'a T) -> Self {
        Self { client, transport }
    }
}

impl<T: Transport + ?Sized> StatusProbe for InstanceProbe<'_, T> {
    type Status = InstanceStatus;

    fn resource(&self) -> &'static str {
        "instance"
    }

    fn status(&self, id: &str) -> Result<InstanceStatus, ApiError> {
        let request = self.client.build_get_instance_detail(id)?;
        let response = self.client.send(self.transport, &request)?;
        Ok(self.client.parse_get_instance_detail(response)?.instance.status)
    }
}

/// Probes CDS volumes through `GetCdsVolumeDetail`.
pub struct VolumeProbe<'a, T: ?Sized> {
    client: &'a BccClient,
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> VolumeProbe<'a, T> {
    pub fn new(client: &'a BccClient, transport: &'a T) -> Self {
        Self { client, transport }
    }
}

impl<T: Transport + ?Sized> StatusProbe for VolumeProbe<'_, T> {
    type Status = VolumeStatus;

    fn resource(&self) -> &'static str {
        "volume"
    }

    fn status(&self, id: &str) -> Result<VolumeStatus, ApiError> {
        let request = self.client.build_get_cds_volume_detail(id)?;
        let response = self.client.send(self.transport, &request)?;
        Ok(self.client.parse_get_cds_volume_detail(response)?.volume.status)
    }
}

/// Poll `probe` until `id` reports one of `targets`.
///
/// The first read happens immediately. Probe errors end the wait at once;
/// only the deadline turns into `ApiError::Timeout`, which carries the last
/// status observed.
pub fn await_state<P: StatusProbe + ?Sized>(
    probe: &P,
    id: &str,
    targets: &[P::Status],
    policy: &WaitPolicy,
) -> Result<P::Status, ApiError> {
    if targets.is_empty() {
        return Err(ApiError::invalid("at least one target status is required"));
    }
    let start = Instant::now();
    loop {
        let status = probe.status(id)?;
        let waited = start.elapsed();
        debug!(resource = probe.resource(), id, status = status.as_str(), ?waited, "polled status");

        if targets.contains(&status) {
            info!(resource = probe.resource(), id, status = status.as_str(), ?waited, "reached target status");
            return Ok(status);
        }
        if waited >= policy.timeout {
            return Err(ApiError::Timeout {
                resource: probe.resource(),
                id: id.to_string(),
                last_status: Some(status.as_str().to_string()),
                waited,
            });
        }
        sleep(policy.poll_interval.min(policy.timeout - waited));
    }
}

impl BccClient {
    pub fn wait_for_instance<T: Transport + ?Sized>(
        &self,
        transport: &T,
        instance_id: &str,
        targets: &[InstanceStatus],
        policy: &WaitPolicy,
    ) -> Result<InstanceStatus, ApiError> {
        await_state(&InstanceProbe::new(self, transport), instance_id, targets, policy)
    }

    pub fn wait_for_volume<T: Transport + ?Sized>(
        &self,
        transport: &T,
        volume_id: &str,
        targets: &[VolumeStatus],
        policy: &WaitPolicy,
    ) -> Result<VolumeStatus, ApiError> {
        await_state(&VolumeProbe::new(self, transport), volume_id, targets, policy)
    }
}
