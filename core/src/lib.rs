//! Synchronous client bindings for the Influitive advocate-hub API.
//!
//! # Overview
//! `InfluitiveClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network (host-does-IO pattern). `Transport`
//! performs the round-trip; `UreqTransport` is the blocking default.
//! `pagination::fetch_all` walks the paginated contact listing and
//! `Influitive` wraps everything into one call per operation.
//!
//! # Design
//! - `ClientConfig` is immutable and carries the base URL, so tests can point
//!   the client at a mock server.
//! - Each endpoint is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - Failures are terminal and carried as `ApiError`; nothing is retried and
//!   response bodies are kept on the error rather than printed.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pagination;
pub mod transport;
pub mod types;

pub use api::Influitive;
pub use client::InfluitiveClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, ContinuationError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use pagination::fetch_all;
pub use transport::UreqTransport;
pub use types::{
    ContactsPage, CreateMember, EventLogged, Invitation, Level, Links, LogCustomEvent, LogEvent, Member, QueryFilter,
    EVENT_REFERRAL_SUBMITTED, MEMBER_SCHEMA_VERSION,
};
