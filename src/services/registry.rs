//! Service registry.
//!
//! # Responsibilities
//! - Build one configured client per backend service
//! - Share transport, trace context and observer between them
//! - Allow per-service overrides (tests, per-request auth)
//!
//! # Design Decisions
//! - Explicit value passed to callers, not module-level singletons
//! - Only the primary backend client carries the path-prefix exception rules;
//!   the other clients send every path to their own origin

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;

use crate::config::schema::{ClientConfig, RouteConfig, Service};
use crate::config::validation::validate_config;
use crate::config::ConfigError;
use crate::error::{ApiError, ApiResult};
use crate::http::client::{ApiClient, Transport};
use crate::observability::logging::{CallObserver, TracingObserver};
use crate::observability::tracing::TraceContext;
use crate::resilience::RetryPolicy;
use crate::routing::ServiceRouter;
use crate::services::connections;
use crate::services::types::{Connection, HealthStatus};

/// One client per [`Service`].
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    clients: HashMap<Service, ApiClient>,
}

impl ServiceRegistry {
    /// Build clients with a fresh trace session and the default observer.
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        let observer = TracingObserver::shared(config.observability.metrics_enabled);
        Self::with_observer(config, observer, Arc::new(TraceContext::new_session()))
    }

    /// Build clients reporting to `observer` under the given trace session.
    pub fn with_observer(
        config: &ClientConfig,
        observer: Arc<dyn CallObserver>,
        trace: Arc<TraceContext>,
    ) -> ApiResult<Self> {
        validate_config(config).map_err(|errors| ApiError::Config(ConfigError::Validation(errors)))?;

        let transport = Transport::new(&config.timeouts, config.graphql.include_credentials)?;
        let retry = RetryPolicy::from(&config.retries);
        let backend_routes = config.effective_routes();

        let mut clients = HashMap::with_capacity(Service::ALL.len());
        for service in Service::ALL {
            let routes: &[RouteConfig] = if service == Service::Backend {
                &backend_routes
            } else {
                &[]
            };
            let router = ServiceRouter::from_config(service, &config.services, routes)?;

            let client = ApiClient::builder(service)
                .router(router)
                .transport(transport.clone())
                .trace(trace.clone())
                .observer(observer.clone())
                .timeouts(config.timeouts.clone())
                .retry(retry.clone())
                .graphql_endpoint(config.graphql.endpoint.clone())
                .build()?;
            clients.insert(service, client);
        }

        tracing::info!(
            services = clients.len(),
            trace_id = %trace.trace_id(),
            "Service registry initialized"
        );

        Ok(Self { clients })
    }

    /// Client for `service`.
    pub fn client(&self, service: Service) -> &ApiClient {
        // Every service is inserted at construction and never removed.
        &self.clients[&service]
    }

    pub fn backend(&self) -> &ApiClient {
        self.client(Service::Backend)
    }

    pub fn auth(&self) -> &ApiClient {
        self.client(Service::Auth)
    }

    pub fn data(&self) -> &ApiClient {
        self.client(Service::Data)
    }

    pub fn billing(&self) -> &ApiClient {
        self.client(Service::Billing)
    }

    pub fn security(&self) -> &ApiClient {
        self.client(Service::Security)
    }

    /// Replace the client for its service.
    pub fn with_client(mut self, client: ApiClient) -> Self {
        self.clients.insert(client.service(), client);
        self
    }

    /// Copy of the registry whose clients all send `Authorization: Bearer <token>`.
    pub fn with_bearer_token(&self, token: &str) -> ApiResult<Self> {
        let clients = self
            .clients
            .iter()
            .map(|(service, client)| Ok((*service, client.with_bearer_token(token)?)))
            .collect::<ApiResult<HashMap<_, _>>>()?;
        Ok(Self { clients })
    }

    /// Merged platform connections from the auth and security services.
    pub async fn list_connections(&self) -> ApiResult<Vec<Connection>> {
        connections::list_connections(self.auth(), self.security()).await
    }

    /// Check `/health` on every service concurrently.
    pub async fn health_all(&self) -> Vec<(Service, ApiResult<HealthStatus>)> {
        let checks = Service::ALL.into_iter().map(|service| async move {
            (service, self.client(service).health().await)
        });
        join_all(checks).await
    }
}
