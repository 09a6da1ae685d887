//! HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! Caller
//!     → request.rs (endpoint, body, caller headers, deadline override)
//!     → client.rs (route lookup, header merge, deadline, retries)
//!     → reqwest transport
//!     → response.rs (JSON parse, error message extraction, unwrapping)
//!     → CallRecord to the observer, result to the caller
//!
//! GraphQL:
//!     → graphql.rs (fixed endpoint, cookie transport, errors[] / data rules)
//! ```

pub mod client;
pub mod graphql;
pub mod request;
pub mod response;

pub use client::{ApiClient, ApiClientBuilder, Transport};
pub use graphql::{GraphQlError, GraphQlResponse};
pub use request::ApiRequest;
pub use response::{decode_payload, unwrap_response, ApiResponse, Payload};
