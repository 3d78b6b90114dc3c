//! Request construction and response decoding for the Baidu Cloud Compute
//! (BCC) management API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network. A caller-supplied `Transport` executes the actual
//! HTTP round-trip (and signs it), which keeps the core deterministic and
//! testable.
//!
//! # Design
//! - `BccClient` is stateless. It holds only its validated `ClientConfig`.
//! - Each operation is split into `build_*` (produces a request, validating
//!   input first) and `parse_*` (consumes a response), so the I/O boundary is
//!   explicit.
//! - `Billing` is a sum type: a reservation exists only for prepaid billing.
//! - List calls return one `Page` at a time; the caller drives pagination.
//! - `waiter` and `workflows` compose the pairs with a transport for the
//!   create-then-poll flows.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod page;
pub mod transport;
pub mod types;
pub mod waiter;
pub mod workflows;

pub use client::BccClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use page::Page;
pub use transport::Transport;
pub use types::{Billing, ClientToken, PaymentTiming, Reservation, ReservationTimeUnit};
pub use waiter::{await_state, InstanceProbe, StatusProbe, VolumeProbe, WaitPolicy};
