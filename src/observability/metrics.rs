//! Metrics collection.
//!
//! # Metrics
//! - `conhub_client_requests_total` (counter): calls by service, method, status
//! - `conhub_client_request_duration_seconds` (histogram): latency distribution
//! - `conhub_client_retries_total` (counter): retry attempts by service
//!
//! # Design Decisions
//! - Recorder-agnostic: the embedding application installs an exporter
//! - Status 0 means no HTTP response was received

use std::time::Duration;

use crate::config::schema::Service;

/// Record the outcome of one logical call.
pub fn record_call(service: Service, method: &str, status: u16, duration: Duration) {
    let labels = [
        ("service", service.as_str().to_string()),
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];

    ::metrics::counter!("conhub_client_requests_total", &labels).increment(1);
    ::metrics::histogram!("conhub_client_request_duration_seconds", &labels)
        .record(duration.as_secs_f64());
}

/// Record a retry attempt.
pub fn record_retry(service: Service) {
    ::metrics::counter!("conhub_client_retries_total", "service" => service.as_str()).increment(1);
}
