//! HTTP client core.
//!
//! # Responsibilities
//! - Resolve the origin of each call through the service router
//! - Merge default, trace and caller headers (caller wins)
//! - Enforce the per-attempt deadline and bounded retries
//! - Normalize every response into JSON or an [`ApiError`]
//! - Emit exactly one [`CallRecord`] per logical call
//!
//! # Design Decisions
//! - One reqwest client per transport, shared by every service client
//! - GraphQL uses its own transport with a cookie store
//! - Errors are never swallowed; recovery belongs to the caller

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder};
use serde_json::Value;

use crate::config::schema::{ClientConfig, Service, TimeoutConfig};
use crate::error::{ApiError, ApiResult};
use crate::http::request::{ApiRequest, RequestBody};
use crate::http::response::RawResponse;
use crate::observability::logging::{CallObserver, CallRecord, TracingObserver};
use crate::observability::metrics;
use crate::observability::tracing::TraceContext;
use crate::resilience::retries::{is_retryable, RetryPolicy};
use crate::resilience::timeouts::with_deadline;
use crate::routing::ServiceRouter;

/// Underlying HTTP connections shared by every service client.
#[derive(Debug, Clone)]
pub struct Transport {
    rest: reqwest::Client,
    graphql: reqwest::Client,
}

impl Transport {
    /// Build both transports. `include_credentials` keeps cookies on the GraphQL path.
    pub fn new(timeouts: &TimeoutConfig, include_credentials: bool) -> ApiResult<Self> {
        let rest = reqwest::Client::builder()
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;

        let graphql = reqwest::Client::builder()
            .connect_timeout(timeouts.connect())
            .cookie_store(include_credentials)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build GraphQL client: {}", e)))?;

        Ok(Self { rest, graphql })
    }

    pub(crate) fn rest(&self) -> &reqwest::Client {
        &self.rest
    }

    pub(crate) fn graphql(&self) -> &reqwest::Client {
        &self.graphql
    }
}

#[derive(Clone)]
struct ClientInner {
    service: Service,
    router: ServiceRouter,
    transport: Transport,
    trace: Arc<TraceContext>,
    observer: Arc<dyn CallObserver>,
    timeout: Duration,
    retry: RetryPolicy,
    graphql_endpoint: String,
    /// Headers sent on every call, below caller headers.
    default_headers: HeaderMap,
}

/// Client for one backend service.
///
/// Cheap to clone; clones share configuration, transport and trace context.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("service", &self.inner.service)
            .field("origin", &self.inner.router.default_origin().as_str())
            .field("timeout", &self.inner.timeout)
            .field("retry", &self.inner.retry)
            .finish()
    }
}

impl ApiClient {
    /// Start building a client for `service`.
    pub fn builder(service: Service) -> ApiClientBuilder {
        ApiClientBuilder::new(service)
    }

    /// Client with default settings talking to `base_url`.
    pub fn new(service: Service, base_url: &str) -> ApiResult<Self> {
        Self::builder(service).base_url(base_url).build()
    }

    pub fn service(&self) -> Service {
        self.inner.service
    }

    pub fn router(&self) -> &ServiceRouter {
        &self.inner.router
    }

    pub fn trace(&self) -> &TraceContext {
        &self.inner.trace
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry
    }

    pub(crate) fn graphql_endpoint(&self) -> &str {
        &self.inner.graphql_endpoint
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.inner.transport
    }

    /// Copy of this client that sends `Authorization: Bearer <token>` on every call.
    pub fn with_bearer_token(&self, token: &str) -> ApiResult<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidRequest("bearer token is not a valid header value".to_string()))?;
        value.set_sensitive(true);

        let mut inner = (*self.inner).clone();
        inner.default_headers.insert(AUTHORIZATION, value);
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn get(&self, endpoint: impl Into<String>) -> ApiRequest<'_> {
        ApiRequest::new(self, Method::GET, endpoint.into())
    }

    pub fn post(&self, endpoint: impl Into<String>) -> ApiRequest<'_> {
        ApiRequest::new(self, Method::POST, endpoint.into())
    }

    pub fn put(&self, endpoint: impl Into<String>) -> ApiRequest<'_> {
        ApiRequest::new(self, Method::PUT, endpoint.into())
    }

    pub fn delete(&self, endpoint: impl Into<String>) -> ApiRequest<'_> {
        ApiRequest::new(self, Method::DELETE, endpoint.into())
    }

    /// Multipart upload. No `Content-Type` is set; the transport adds the boundary.
    pub fn post_form(&self, endpoint: impl Into<String>, form: Form) -> ApiRequest<'_> {
        ApiRequest::new(self, Method::POST, endpoint.into()).form(form)
    }

    /// `Content-Type` (unless multipart), trace headers, client defaults, then caller headers.
    pub(crate) fn merged_headers(&self, multipart: bool, extra: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if !multipart {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        headers.extend(self.inner.trace.headers());
        for (name, value) in self.inner.default_headers.iter().chain(extra.iter()) {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    /// Send one attempt and read the full body.
    pub(crate) async fn send_attempt(builder: RequestBuilder) -> ApiResult<RawResponse> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn emit(
        &self,
        method: &Method,
        endpoint: &str,
        url: Option<&str>,
        status: u16,
        started: Instant,
        attempts: u32,
        error: Option<&ApiError>,
    ) {
        let record = CallRecord {
            service: self.inner.service,
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            url: url.map(str::to_string),
            status,
            duration: started.elapsed(),
            attempts,
            error: error.map(ToString::to_string),
            trace: (*self.inner.trace).clone(),
        };
        self.inner.observer.on_call(&record);
    }

    /// Execute a REST call and return the parsed JSON body.
    pub(crate) async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        mut body: RequestBody,
        extra: &HeaderMap,
        timeout: Option<Duration>,
    ) -> ApiResult<Value> {
        let started = Instant::now();

        let url = match self.inner.router.url_for(endpoint) {
            Ok(url) => url,
            Err(err) => {
                self.emit(&method, endpoint, None, 0, started, 0, Some(&err));
                return Err(err);
            }
        };

        let deadline = timeout.unwrap_or(self.inner.timeout);
        let headers = self.merged_headers(body.is_multipart(), extra);
        let max_attempts = if body.is_multipart() {
            1
        } else {
            self.inner.retry.max_attempts(&method)
        };
        let mut attempts = 0;

        let outcome = loop {
            attempts += 1;

            let builder = self
                .inner
                .transport
                .rest()
                .request(method.clone(), url.clone())
                .headers(headers.clone());
            let builder = match body.apply(builder) {
                Ok(builder) => builder,
                Err(err) => break Err(err),
            };

            tracing::debug!(
                service = %self.inner.service,
                attempt = attempts,
                %method,
                %url,
                "Sending request"
            );

            let result = with_deadline(deadline, Self::send_attempt(builder)).await;

            let retry = match &result {
                Ok(raw) => is_retryable(&method, Some(raw.status), false),
                Err(err) => err.is_transport() && is_retryable(&method, None, true),
            };

            if retry && attempts < max_attempts {
                let delay = self.inner.retry.backoff(attempts);
                match &result {
                    Ok(raw) => tracing::info!(
                        service = %self.inner.service,
                        attempt = attempts,
                        delay = ?delay,
                        status = %raw.status,
                        "Retrying request"
                    ),
                    Err(err) => tracing::info!(
                        service = %self.inner.service,
                        attempt = attempts,
                        delay = ?delay,
                        error = %err,
                        "Retrying after transport error"
                    ),
                }
                metrics::record_retry(self.inner.service);
                tokio::time::sleep(delay).await;
                continue;
            }

            break result;
        };

        let (status, result) = match outcome {
            Ok(raw) => (raw.status.as_u16(), raw.into_json()),
            Err(err) => (0, Err(err)),
        };

        self.emit(
            &method,
            endpoint,
            Some(url.as_str()),
            status,
            started,
            attempts,
            result.as_ref().err(),
        );
        result
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    service: Service,
    base_url: Option<String>,
    router: Option<ServiceRouter>,
    transport: Option<Transport>,
    trace: Option<Arc<TraceContext>>,
    observer: Option<Arc<dyn CallObserver>>,
    timeouts: TimeoutConfig,
    retry: RetryPolicy,
    graphql_endpoint: String,
    include_credentials: bool,
}

impl ApiClientBuilder {
    fn new(service: Service) -> Self {
        let defaults = ClientConfig::default();
        Self {
            service,
            base_url: None,
            router: None,
            transport: None,
            trace: None,
            observer: None,
            timeouts: defaults.timeouts,
            retry: RetryPolicy::from(&defaults.retries),
            graphql_endpoint: defaults.graphql.endpoint,
            include_credentials: defaults.graphql.include_credentials,
        }
    }

    /// Single origin for every path. Ignored when [`router`](Self::router) is set.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn router(mut self, router: ServiceRouter) -> Self {
        self.router = Some(router);
        self
    }

    pub fn transport(mut self, transport: Transport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn trace(mut self, trace: Arc<TraceContext>) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn CallObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Per-attempt deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request_ms = timeout.as_millis() as u64;
        self
    }

    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn graphql_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.graphql_endpoint = endpoint.into();
        self
    }

    pub fn include_credentials(mut self, enabled: bool) -> Self {
        self.include_credentials = enabled;
        self
    }

    pub fn build(self) -> ApiResult<ApiClient> {
        let router = match (self.router, self.base_url) {
            (Some(router), _) => router,
            (None, Some(base)) => {
                let origin = crate::config::validation::parse_origin(&base)
                    .map_err(|reason| ApiError::InvalidRequest(format!("invalid base URL '{}': {}", base, reason)))?;
                ServiceRouter::new(self.service, origin)
            }
            (None, None) => {
                return Err(ApiError::InvalidRequest(format!(
                    "client for service '{}' has no base URL",
                    self.service
                )))
            }
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => Transport::new(&self.timeouts, self.include_credentials)?,
        };

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                service: self.service,
                router,
                transport,
                trace: self.trace.unwrap_or_else(|| Arc::new(TraceContext::new_session())),
                observer: self.observer.unwrap_or_else(|| TracingObserver::shared(true)),
                timeout: self.timeouts.request(),
                retry: self.retry,
                graphql_endpoint: self.graphql_endpoint,
                default_headers: HeaderMap::new(),
            }),
        })
    }
}
