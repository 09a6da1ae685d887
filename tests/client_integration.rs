//! End-to-end behaviour of the client against mock services.

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use common::{client, closed_origin, fast_retry, start_mock_backend, test_trace, CollectingObserver};
use conhub_client::resilience::RetryPolicy;
use conhub_client::services::types::{Connection, DocumentQuery};
use conhub_client::{unwrap_response, ApiError, ClientConfig, Service, ServiceRegistry};

#[tokio::test]
async fn test_get_returns_exact_body() {
    let payload = json!({
        "success": true,
        "data": [{"id": "d1", "name": "README.md", "source": "github", "type": "markdown"}],
        "meta": {"page": 1}
    });
    let body = payload.clone();
    let router = Router::new().route("/api/documents", get(move || async move { Json(body) }));
    let origin = start_mock_backend(router).await;

    let observer = CollectingObserver::shared();
    let api = client(&origin, observer.clone(), RetryPolicy::disabled());

    let value = api.get("/api/documents").send_value().await.unwrap();
    assert_eq!(value, payload);
    assert_eq!(unwrap_response(value)[0]["id"], "d1");

    let records = observer.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, 200);
    assert_eq!(records[0].attempts, 1);
    assert!(records[0].is_success());
}

#[tokio::test]
async fn test_get_returns_nested_page_unchanged() {
    let payload = json!({"success": true, "data": {"data": [], "total": 0}});
    let body = payload.clone();
    let router = Router::new().route("/api/documents", get(move || async move { Json(body) }));
    let origin = start_mock_backend(router).await;
    let api = client(&origin, CollectingObserver::shared(), RetryPolicy::disabled());

    let value = api.get("/api/documents").send_value().await.unwrap();
    assert_eq!(value, payload);

    let page = api.list_documents(&DocumentQuery::default()).await.unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_error_message_precedence() {
    let router = Router::new()
        .route(
            "/api/documents/missing",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": "Document not found", "message": "ignored"})),
                )
            }),
        )
        .route(
            "/api/documents/locked",
            get(|| async { (StatusCode::FORBIDDEN, Json(json!({"message": "Locked"}))) }),
        )
        .route(
            "/api/documents/bare",
            get(|| async { (StatusCode::BAD_REQUEST, Json(json!({}))) }),
        );
    let origin = start_mock_backend(router).await;
    let api = client(&origin, CollectingObserver::shared(), RetryPolicy::disabled());

    match api.get("/api/documents/missing").send_value().await {
        Err(ApiError::Http { status, message, body }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Document not found");
            assert_eq!(body["message"], "ignored");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let err = api.get("/api/documents/locked").send_value().await.unwrap_err();
    assert_eq!(err.to_string(), "Locked");

    let err = api.get("/api/documents/bare").send_value().await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP error! status: 400");
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let router = Router::new().route("/health", get(|| async { "OK" }));
    let origin = start_mock_backend(router).await;
    let api = client(&origin, CollectingObserver::shared(), RetryPolicy::disabled());

    let err = api.get("/health").send_value().await.unwrap_err();
    assert!(matches!(err, ApiError::Parse { status: 200, .. }));
    assert_eq!(err.to_string(), "Failed to parse response: OK");
}

#[tokio::test]
async fn test_offline_emits_single_record() {
    let origin = closed_origin().await;
    let observer = CollectingObserver::shared();
    let api = client(&origin, observer.clone(), fast_retry(2));

    let err = api.get("/api/agents").send_value().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(err.is_transport());

    let records = observer.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, 0);
    assert_eq!(records[0].attempts, 3);
    assert_eq!(records[0].error.as_deref(), Some(err.to_string().as_str()));
}

fn flaky_router(hits: Arc<AtomicU32>, failures: u32) -> Router {
    let handler = move |State(hits): State<Arc<AtomicU32>>| async move {
        let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= failures {
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": "unavailable"})))
        } else {
            (StatusCode::OK, Json(json!({"success": true, "data": {"n": n}})))
        }
    };
    Router::new()
        .route("/api/flaky", get(handler.clone()).post(handler))
        .with_state(hits)
}

#[tokio::test]
async fn test_retries_transient_status_once_per_call_record() {
    let hits = Arc::new(AtomicU32::new(0));
    let origin = start_mock_backend(flaky_router(hits.clone(), 2)).await;
    let observer = CollectingObserver::shared();
    let api = client(&origin, observer.clone(), fast_retry(3));

    let data: Value = api.get("/api/flaky").send_enveloped().await.unwrap();
    assert_eq!(data, json!({"n": 3}));
    assert_eq!(hits.load(Ordering::SeqCst), 3);

    let records = observer.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].attempts, 3);
    assert_eq!(records[0].status, 200);
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_error() {
    let hits = Arc::new(AtomicU32::new(0));
    let origin = start_mock_backend(flaky_router(hits.clone(), 10)).await;
    let observer = CollectingObserver::shared();
    let api = client(&origin, observer.clone(), fast_retry(1));

    let err = api.get("/api/flaky").send_value().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.to_string(), "unavailable");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(observer.records().len(), 1);
}

#[tokio::test]
async fn test_post_is_never_retried() {
    let hits = Arc::new(AtomicU32::new(0));
    let origin = start_mock_backend(flaky_router(hits.clone(), 10)).await;
    let observer = CollectingObserver::shared();
    let api = client(&origin, observer.clone(), fast_retry(3));

    let err = api
        .post("/api/flaky")
        .json(&json!({"name": "agent"}))
        .send_value()
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(observer.records()[0].attempts, 1);
}

#[tokio::test]
async fn test_timeout() {
    let router = Router::new().route(
        "/api/slow",
        get(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(json!({}))
        }),
    );
    let origin = start_mock_backend(router).await;
    let observer = CollectingObserver::shared();
    let api = client(&origin, observer.clone(), RetryPolicy::disabled());

    let err = api
        .get("/api/slow")
        .timeout(Duration::from_millis(100))
        .send_value()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Timeout(d) if d == Duration::from_millis(100)));

    let records = observer.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, 0);
}

#[tokio::test]
async fn test_trace_headers_and_caller_override() {
    let router = Router::new().route(
        "/api/echo",
        get(|headers: HeaderMap| async move {
            let header = |name: &str| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            };
            Json(json!({
                "trace": header("x-trace-id"),
                "span": header("x-span-id"),
                "request": header("x-request-id"),
                "content_type": header("content-type"),
                "authorization": header("authorization"),
            }))
        }),
    );
    let origin = start_mock_backend(router).await;
    let api = client(&origin, CollectingObserver::shared(), RetryPolicy::disabled());

    let echoed = api.get("/api/echo").send_value().await.unwrap();
    assert_eq!(echoed["trace"], "trace-test");
    assert_eq!(echoed["span"], "span-test");
    assert_eq!(echoed["request"], "req-test");
    assert_eq!(echoed["content_type"], "application/json");
    assert_eq!(echoed["authorization"], "");

    let echoed = api
        .with_bearer_token("default-token")
        .unwrap()
        .get("/api/echo")
        .header("x-request-id", "caller-request")
        .bearer_auth("caller-token")
        .send_value()
        .await
        .unwrap();
    assert_eq!(echoed["trace"], "trace-test");
    assert_eq!(echoed["request"], "caller-request");
    assert_eq!(echoed["authorization"], "Bearer caller-token");
}

#[tokio::test]
async fn test_multipart_upload_keeps_transport_content_type() {
    let router = Router::new().route(
        "/api/documents/upload",
        post(|headers: HeaderMap, body: Bytes| async move {
            let content_type = headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let tags: Vec<&str> = if String::from_utf8_lossy(&body).contains("hello conhub") {
                vec!["received"]
            } else {
                Vec::new()
            };
            Json(json!({
                "success": true,
                "data": {
                    "id": "doc-9",
                    "name": "notes.txt",
                    "status": content_type,
                    "tags": tags
                }
            }))
        }),
    );
    let origin = start_mock_backend(router).await;
    let api = client(&origin, CollectingObserver::shared(), fast_retry(3));

    let doc = api
        .upload_document("notes.txt", b"hello conhub".to_vec(), "text/plain")
        .await
        .unwrap();
    assert_eq!(doc.id, "doc-9");
    assert!(doc.status.unwrap().starts_with("multipart/form-data; boundary="));
    assert_eq!(doc.tags, vec!["received".to_string()]);
}

#[tokio::test]
async fn test_envelope_failure_is_application_error() {
    let router = Router::new().route(
        "/api/documents",
        get(|| async { Json(json!({"success": false, "error": "Quota exceeded"})) }),
    );
    let origin = start_mock_backend(router).await;
    let api = client(&origin, CollectingObserver::shared(), RetryPolicy::disabled());

    let err = api.list_documents(&DocumentQuery::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::Application(ref msg) if msg == "Quota exceeded"));
}

#[tokio::test]
async fn test_resource_ids_stay_in_one_path_segment() {
    let router = Router::new().route(
        "/api/agents/{id}",
        get(|Path(id): Path<String>| async move {
            Json(json!({"success": true, "data": {"id": id, "name": "echo", "status": "active"}}))
        }),
    );
    let origin = start_mock_backend(router).await;
    let observer = CollectingObserver::shared();
    let api = client(&origin, observer.clone(), RetryPolicy::disabled());

    let agent = api.get_agent("team/a?b=1").await.unwrap();
    assert_eq!(agent.id, "team/a?b=1");
    assert!(observer.records()[0]
        .url
        .as_deref()
        .unwrap()
        .ends_with("/api/agents/team%2Fa%3Fb%3D1"));

    let err = api.get_agent("..").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert_eq!(observer.records().len(), 1);
}

#[tokio::test]
async fn test_graphql() {
    let router = Router::new().route(
        "/api/graphql",
        post(|Json(request): Json<Value>| async move {
            match request["query"].as_str().unwrap_or_default() {
                "{ ok }" => Json(json!({"data": {"ok": request["variables"]["n"]}})),
                "{ partial }" => Json(json!({
                    "data": {"partial": 1},
                    "errors": [{"message": "field failed"}, {"message": "second"}]
                })),
                "{ nullpath }" => Json(json!({
                    "data": null,
                    "errors": [{"message": "x", "path": null}]
                })),
                _ => Json(json!({"errors": null})),
            }
        }),
    );
    let origin = start_mock_backend(router).await;
    let observer = CollectingObserver::shared();
    let api = client(&origin, observer.clone(), fast_retry(3));

    let data: Value = api.graphql("{ ok }", json!({"n": 7})).await.unwrap();
    assert_eq!(data, json!({"ok": 7}));

    let err = api.graphql::<Value>("{ partial }", json!({})).await.unwrap_err();
    match err {
        ApiError::GraphQl { status, messages } => {
            assert_eq!(status, 200);
            assert_eq!(messages, vec!["field failed", "second"]);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let err = api.graphql::<Value>("{ nullpath }", json!({})).await.unwrap_err();
    assert!(matches!(err, ApiError::GraphQl { ref messages, .. } if messages == &vec!["x".to_string()]));

    let err = api.graphql::<Value>("{ nothing }", json!({})).await.unwrap_err();
    assert!(matches!(err, ApiError::MissingData));

    let records = observer.records();
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.method == "POST" && r.attempts == 1));
}

fn registry_config(backend: &str, auth: &str, security: &str) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.services.backend = backend.to_string();
    config.services.auth = auth.to_string();
    config.services.security = security.to_string();
    config.services.data = backend.to_string();
    config.services.billing = backend.to_string();
    config.retries.retry_delay_ms = 5;
    config.retries.max_delay_ms = 20;
    config
}

#[tokio::test]
async fn test_registry_routes_auth_paths_and_merges_connections() {
    let auth = start_mock_backend(Router::new().route(
        "/api/auth/connections",
        get(|| async {
            Json(json!({
                "success": true,
                "data": [{"platform": "github", "connected": true, "username": "octo"}]
            }))
        }),
    ))
    .await;
    let security = start_mock_backend(Router::new().route(
        "/api/security/connections",
        get(|| async {
            Json(json!({
                "success": true,
                "data": [
                    {"platform": "github", "connected": false},
                    {"platform": "notion", "connected": true}
                ]
            }))
        }),
    ))
    .await;
    let backend = start_mock_backend(Router::new()).await;

    let observer = CollectingObserver::shared();
    let registry = ServiceRegistry::with_observer(
        &registry_config(&backend, &auth, &security),
        observer.clone(),
        test_trace(),
    )
    .unwrap();

    // The backend client sends auth paths to the auth origin.
    let via_backend: Vec<Connection> = registry
        .backend()
        .get("/api/auth/connections")
        .send_enveloped()
        .await
        .unwrap();
    assert_eq!(via_backend.len(), 1);
    assert!(observer.records()[0].url.as_deref().unwrap().starts_with(&auth));

    let merged = registry.list_connections().await.unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].platform, "github");
    assert!(merged[0].connected);
    assert_eq!(merged[0].username.as_deref(), Some("octo"));
    assert_eq!(merged[1].platform, "notion");

    let services: Vec<Service> = observer.records().iter().map(|r| r.service).collect();
    assert!(services.contains(&Service::Auth));
    assert!(services.contains(&Service::Security));
}

#[tokio::test]
async fn test_connections_tolerate_one_failed_source() {
    let auth = start_mock_backend(Router::new().route(
        "/api/auth/connections",
        get(|| async {
            Json(json!({"success": true, "data": [{"platform": "slack", "connected": true}]}))
        }),
    ))
    .await;
    let security = closed_origin().await;
    let backend = start_mock_backend(Router::new()).await;

    let mut config = registry_config(&backend, &auth, &security);
    config.retries.enabled = false;
    let registry =
        ServiceRegistry::with_observer(&config, CollectingObserver::shared(), test_trace()).unwrap();

    let merged = registry.list_connections().await.unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].platform, "slack");
}
