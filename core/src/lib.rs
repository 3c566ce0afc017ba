//! Shared contract and typed client for the todo service.
//!
//! # Overview
//! This crate is the single source of truth for the todo API. It holds the
//! validation schemas, the route tables of both contract variants, the wire
//! DTOs, and a client that renders requests from and parses responses
//! against those same definitions. The server crate registers its handlers
//! from the same route tables, so the two cannot drift apart.
//!
//! # Design
//! - `schema` validates untyped JSON without coercion and reports every
//!   violated constraint.
//! - `contract` holds `Route` descriptors and the `PatchContract` /
//!   `PutContract` variants; a process picks one via `ContractKind`.
//! - `TodoClient` splits each call into `build_*` and `parse_*` (host-does-IO);
//!   a `Transport` performs the round-trip in between. `create_client` wires
//!   in the blocking `ureq` transport.

pub mod client;
pub mod contract;
pub mod error;
pub mod http;
pub mod schema;
pub mod transport;
pub mod types;

#[cfg(feature = "blocking")]
pub use client::create_client;
pub use client::{ClientOptions, TodoClient};
pub use contract::{
    Contract, ContractError, ContractKind, CreatePayload, Operation, PatchContract, PathParams,
    PutContract, Route, RouteTable, UpdatePayload,
};
pub use error::{ClientError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use schema::{Issue, Schema, ValidationError};
#[cfg(feature = "blocking")]
pub use transport::UreqTransport;
pub use transport::{Transport, TransportError};
pub use types::{TodoError, TodoItem};
