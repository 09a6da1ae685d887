//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to a backend service:
//!     → timeouts.rs (enforce per-attempt deadline)
//!     → On failure: retries.rs (check if retryable)
//!     → backoff.rs (sleep with exponential backoff + jitter)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every call has a deadline
//! - Retries only for idempotent requests (GET, PUT, DELETE)
//! - Retry budget is bounded by configuration, never unbounded

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::RetryPolicy;
