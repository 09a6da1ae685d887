//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backend services the dashboard talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Backend,
    Auth,
    Data,
    Billing,
    Security,
}

impl Service {
    /// All services, in registry order.
    pub const ALL: [Service; 5] = [
        Service::Backend,
        Service::Auth,
        Service::Data,
        Service::Billing,
        Service::Security,
    ];

    /// Stable lowercase name used in config, logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Backend => "backend",
            Service::Auth => "auth",
            Service::Data => "data",
            Service::Billing => "billing",
            Service::Security => "security",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|svc| svc.as_str() == s.to_ascii_lowercase())
            .ok_or_else(|| format!("unknown service '{}'", s))
    }
}

/// Root configuration for the client layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Base origin of each backend service.
    pub services: ServicesConfig,

    /// Path-prefix routing rules for the primary backend client.
    pub routes: Vec<RouteConfig>,

    /// Deadline configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// GraphQL call path settings.
    pub graphql: GraphQlConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ClientConfig {
    /// Configured routes followed by the built-in auth rule.
    ///
    /// Configured rules are checked first, so they may shadow the default.
    pub fn effective_routes(&self) -> Vec<RouteConfig> {
        let mut routes = self.routes.clone();
        routes.extend(default_routes());
        routes
    }
}

/// Base origins, one per service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub backend: String,
    pub auth: String,
    pub data: String,
    pub billing: String,
    pub security: String,
}

impl ServicesConfig {
    /// Origin configured for `service`.
    pub fn origin(&self, service: Service) -> &str {
        match service {
            Service::Backend => &self.backend,
            Service::Auth => &self.auth,
            Service::Data => &self.data,
            Service::Billing => &self.billing,
            Service::Security => &self.security,
        }
    }

    pub(crate) fn origin_mut(&mut self, service: Service) -> &mut String {
        match service {
            Service::Backend => &mut self.backend,
            Service::Auth => &mut self.auth,
            Service::Data => &mut self.data,
            Service::Billing => &mut self.billing,
            Service::Security => &mut self.security,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            backend: "http://localhost:3001".to_string(),
            auth: "http://localhost:3010".to_string(),
            billing: "http://localhost:3011".to_string(),
            security: "http://localhost:3012".to_string(),
            data: "http://localhost:3013".to_string(),
        }
    }
}

/// Route rule sending a path prefix to another service's origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging.
    pub name: String,

    /// Path prefix to match (segment-aligned).
    pub path_prefix: String,

    /// Service whose origin serves the prefix.
    pub service: Service,
}

/// The single built-in exception: auth routes go to the auth service.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![RouteConfig {
        name: "auth".to_string(),
        path_prefix: "/api/auth".to_string(),
        service: Service::Auth,
    }]
}

/// Deadline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in milliseconds.
    pub connect_ms: u64,

    /// Per-attempt deadline (send + full body read) in milliseconds.
    pub request_ms: u64,
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }

    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 5_000,
            request_ms: 10_000,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Base delay before the first retry, in milliseconds.
    pub retry_delay_ms: u64,

    /// Cap on any single backoff delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            retry_delay_ms: 1_000,
            max_delay_ms: 8_000,
        }
    }
}

/// GraphQL call path settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphQlConfig {
    /// Endpoint path, resolved through the router like any other path.
    pub endpoint: String,

    /// Keep a cookie store on the GraphQL transport.
    pub include_credentials: bool,
}

impl Default for GraphQlConfig {
    fn default() -> Self {
        Self {
            endpoint: "/api/graphql".to_string(),
            include_credentials: true,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,

    /// Record request counters and latency histograms.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "conhub_client=info".to_string(),
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard_constants() {
        let config = ClientConfig::default();
        assert_eq!(config.timeouts.request_ms, 10_000);
        assert_eq!(config.retries.max_retries, 3);
        assert_eq!(config.retries.retry_delay_ms, 1_000);
        assert_eq!(config.graphql.endpoint, "/api/graphql");
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_service_names_round_trip() {
        for svc in Service::ALL {
            assert_eq!(svc.as_str().parse::<Service>().unwrap(), svc);
        }
        assert_eq!("AUTH".parse::<Service>().unwrap(), Service::Auth);
        assert!("payments".parse::<Service>().is_err());
    }

    #[test]
    fn test_distinct_default_origins() {
        let services = ServicesConfig::default();
        let mut origins: Vec<&str> = Service::ALL.iter().map(|s| services.origin(*s)).collect();
        origins.sort();
        origins.dedup();
        assert_eq!(origins.len(), Service::ALL.len());
    }

    #[test]
    fn test_partial_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            [services]
            auth = "https://auth.conhub.dev"

            [[routes]]
            name = "billing"
            path_prefix = "/api/billing"
            service = "billing"
            "#,
        )
        .unwrap();
        assert_eq!(config.services.auth, "https://auth.conhub.dev");
        assert_eq!(config.services.backend, "http://localhost:3001");
        assert_eq!(config.routes[0].service, Service::Billing);

        let effective = config.effective_routes();
        assert_eq!(effective.len(), 2);
        assert_eq!(effective[1].path_prefix, "/api/auth");
    }
}
