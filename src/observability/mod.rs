//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every outbound call produces:
//!     → tracing.rs (trace/span/request id headers)
//!     → logging.rs (one CallRecord delivered to the CallObserver)
//!     → metrics.rs (counters, histograms, via the default observer)
//!
//! Consumers:
//!     → Log aggregation (stderr, plain or JSON)
//!     → Metrics exporter installed by the embedding application
//!     → Backend logs, joined on the correlation headers
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Trace context is session-scoped and shared across service clients
//! - The observer is injected, so tests can count records

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use logging::{CallObserver, CallRecord, TracingObserver};
pub use self::tracing::TraceContext;
