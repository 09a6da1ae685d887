//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use tokio::net::TcpListener;

use conhub_client::observability::{CallObserver, CallRecord, TraceContext};
use conhub_client::resilience::RetryPolicy;
use conhub_client::{ApiClient, Service};

/// Serve `router` on an ephemeral port and return its origin.
pub async fn start_mock_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    format!("http://{}", addr)
}

/// Origin of a port nothing listens on.
pub async fn closed_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Observer that keeps every record it receives.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    records: Mutex<Vec<CallRecord>>,
}

impl CollectingObserver {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<CallRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl CallObserver for CollectingObserver {
    fn on_call(&self, record: &CallRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

/// Retries with millisecond delays so tests stay fast.
pub fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay_ms: 5,
        max_delay_ms: 20,
    }
}

pub fn test_trace() -> Arc<TraceContext> {
    Arc::new(TraceContext::from_parts("trace-test", "span-test", "req-test").unwrap())
}

/// Backend client against `origin` reporting to `observer`.
pub fn client(origin: &str, observer: Arc<CollectingObserver>, retry: RetryPolicy) -> ApiClient {
    ApiClient::builder(Service::Backend)
        .base_url(origin)
        .trace(test_trace())
        .observer(observer)
        .retry(retry)
        .build()
        .unwrap()
}
