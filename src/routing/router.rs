//! Service origin lookup.
//!
//! # Responsibilities
//! - Store compiled path-prefix rules
//! - Resolve the base origin serving an endpoint
//! - Join origin and endpoint into the final request URL
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan (acceptable for a handful of services)
//! - First match wins, in declaration order; unmatched paths use the default

use url::Url;

use crate::config::schema::{RouteConfig, Service, ServicesConfig};
use crate::config::validation::parse_origin;
use crate::error::{ApiError, ApiResult};
use crate::routing::matcher::{Matcher, PathPrefixMatcher};

/// A compiled route: prefix condition plus the origin it resolves to.
#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    pub service: Service,
    pub origin: Url,
    matcher: PathPrefixMatcher,
}

impl Route {
    pub fn new(name: impl Into<String>, prefix: &str, service: Service, origin: Url) -> Self {
        Self {
            name: name.into(),
            service,
            origin,
            matcher: PathPrefixMatcher::new(prefix),
        }
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }
}

/// Maps endpoint paths to the origin of the microservice serving them.
#[derive(Debug, Clone)]
pub struct ServiceRouter {
    default_service: Service,
    default_origin: Url,
    routes: Vec<Route>,
}

impl ServiceRouter {
    /// Router with no exception rules: every path resolves to `origin`.
    pub fn new(service: Service, origin: Url) -> Self {
        Self {
            default_service: service,
            default_origin: origin,
            routes: Vec::new(),
        }
    }

    /// Compile route configs against the configured origins.
    pub fn from_config(
        service: Service,
        services: &ServicesConfig,
        routes: &[RouteConfig],
    ) -> ApiResult<Self> {
        let default_origin = parse(service, services)?;
        let mut router = Self::new(service, default_origin);

        for cfg in routes {
            let origin = parse(cfg.service, services)?;
            router = router.with_route(Route::new(cfg.name.clone(), &cfg.path_prefix, cfg.service, origin));
        }

        tracing::debug!(
            service = %service,
            routes = router.routes.len(),
            "Service router compiled"
        );

        Ok(router)
    }

    /// Append a rule. Rules added earlier take precedence.
    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Find the rule matching `endpoint`, if any.
    pub fn match_endpoint(&self, endpoint: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matcher.matches(endpoint))
    }

    /// Base origin serving `endpoint`.
    pub fn resolve_base(&self, endpoint: &str) -> &Url {
        self.match_endpoint(endpoint)
            .map(|r| &r.origin)
            .unwrap_or(&self.default_origin)
    }

    /// Service serving `endpoint`.
    pub fn resolve_service(&self, endpoint: &str) -> Service {
        self.match_endpoint(endpoint)
            .map(|r| r.service)
            .unwrap_or(self.default_service)
    }

    /// Full URL for `endpoint`, preserving any path on the origin.
    pub fn url_for(&self, endpoint: &str) -> ApiResult<Url> {
        if !endpoint.starts_with('/') {
            return Err(ApiError::InvalidRequest(format!(
                "endpoint '{}' must start with '/'",
                endpoint
            )));
        }
        let base = self.resolve_base(endpoint);
        let joined = format!("{}{}", base.as_str().trim_end_matches('/'), endpoint);
        Url::parse(&joined).map_err(|e| ApiError::InvalidRequest(format!("{}: {}", joined, e)))
    }

    pub fn default_origin(&self) -> &Url {
        &self.default_origin
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

fn parse(service: Service, services: &ServicesConfig) -> ApiResult<Url> {
    let origin = services.origin(service);
    parse_origin(origin).map_err(|reason| {
        ApiError::InvalidRequest(format!(
            "service '{}' has invalid origin '{}': {}",
            service, origin, reason
        ))
    })
}
