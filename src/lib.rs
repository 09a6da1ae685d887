//! ConHub API client library.
//!
//! Typed access to the ConHub backend, auth, data, billing and security
//! services over REST and GraphQL.
//!
//! # Architecture Overview
//!
//! ```text
//!     Caller
//!       │
//!       ▼
//!   ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//!   │   services   │────▶│     http     │────▶│   routing    │
//!   │ registry +   │     │ ApiClient +  │     │ prefix rules │
//!   │ domain calls │     │ GraphQL      │     │ → origin     │
//!   └──────────────┘     └──────┬───────┘     └──────────────┘
//!                               │
//!                               ▼
//!                        ┌──────────────┐
//!                        │  resilience  │──▶ reqwest ──▶ service
//!                        │ deadline +   │
//!                        │ retry/backoff│
//!                        └──────────────┘
//!
//!   Cross-cutting: config (TOML + env), observability (trace headers,
//!   call records, metrics), oauth (one-time code tracking)
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod services;

pub use config::{ClientConfig, Service};
pub use error::{ApiError, ApiResult};
pub use http::{unwrap_response, ApiClient, ApiClientBuilder, ApiResponse};
pub use oauth::{CodeExchangeTracker, CodeState, OAuthError};
pub use observability::{CallObserver, CallRecord, TraceContext, TracingObserver};
pub use services::ServiceRegistry;
