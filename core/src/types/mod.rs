//! Request and response DTOs for the BCC API.
//!
//! # Design
//! Request structs serialize only what the caller set: optional fields are
//! `Option` with `skip_serializing_if`, and idempotency tokens are
//! `#[serde(skip)]` because they travel in the query string. Response structs
//! fail to decode when an identifier or status is missing and ignore fields
//! they do not know.

pub mod billing;
pub mod common;
pub mod deploy_set;
pub mod image;
pub mod instance;
pub mod security_group;
pub mod snapshot;
pub mod volume;

pub use billing::{Billing, PaymentTiming, Reservation, ReservationTimeUnit};
pub use common::{ClientToken, InstanceType, StorageType, Switch, TagModel};
pub use deploy_set::*;
pub use image::*;
pub use instance::*;
pub use security_group::*;
pub use snapshot::*;
pub use volume::*;
