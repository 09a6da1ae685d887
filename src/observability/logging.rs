//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Define the per-call record every request produces
//! - Deliver each record to a pluggable observer
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level configurable via config and environment

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{ObservabilityConfig, Service};
use crate::observability::metrics;
use crate::observability::tracing::TraceContext;

/// Outcome of one logical call, emitted exactly once per call.
#[derive(Debug, Clone)]
pub struct CallRecord {
    /// Service whose client issued the call.
    pub service: Service,
    pub method: String,
    /// Endpoint path as given by the caller.
    pub endpoint: String,
    /// Resolved URL, when resolution succeeded.
    pub url: Option<String>,
    /// Final HTTP status; 0 when no response was received.
    pub status: u16,
    /// Wall-clock time from first attempt to final outcome.
    pub duration: Duration,
    pub attempts: u32,
    /// Error message, when the call failed.
    pub error: Option<String>,
    pub trace: TraceContext,
}

impl CallRecord {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Receives one [`CallRecord`] per logical call.
pub trait CallObserver: Send + Sync + fmt::Debug {
    fn on_call(&self, record: &CallRecord);
}

/// Default observer: tracing event plus request metrics.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    metrics_enabled: bool,
}

impl TracingObserver {
    pub fn new(metrics_enabled: bool) -> Self {
        Self { metrics_enabled }
    }

    pub fn shared(metrics_enabled: bool) -> Arc<dyn CallObserver> {
        Arc::new(Self::new(metrics_enabled))
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CallObserver for TracingObserver {
    fn on_call(&self, record: &CallRecord) {
        let duration_ms = record.duration.as_secs_f64() * 1000.0;

        match &record.error {
            None => tracing::info!(
                service = %record.service,
                method = %record.method,
                endpoint = %record.endpoint,
                status = record.status,
                duration_ms,
                attempts = record.attempts,
                trace_id = %record.trace.trace_id(),
                request_id = %record.trace.request_id(),
                "API call completed"
            ),
            Some(error) => tracing::warn!(
                service = %record.service,
                method = %record.method,
                endpoint = %record.endpoint,
                status = record.status,
                duration_ms,
                attempts = record.attempts,
                trace_id = %record.trace.trace_id(),
                request_id = %record.trace.request_id(),
                error = %error,
                "API call failed"
            ),
        }

        if self.metrics_enabled {
            metrics::record_call(record.service, &record.method, record.status, record.duration);
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`. Calling this twice
/// is harmless; the second installation is ignored.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
