//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every service origin is an absolute http(s) URL
//! - Validate value ranges (timeouts > 0, delay cap >= base delay)
//! - Detect malformed or duplicated route prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::{ClientConfig, Service};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("service '{service}' has invalid origin '{origin}': {reason}")]
    InvalidOrigin {
        service: Service,
        origin: String,
        reason: String,
    },

    #[error("route '{0}' path prefix must start with '/'")]
    RelativePrefix(String),

    #[error("route prefix '{0}' is declared more than once")]
    DuplicatePrefix(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("retries.max_delay_ms ({max}) is below retries.retry_delay_ms ({base})")]
    DelayCapBelowBase { base: u64, max: u64 },

    #[error("graphql.endpoint '{0}' must start with '/'")]
    RelativeGraphQlEndpoint(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for service in Service::ALL {
        let origin = config.services.origin(service);
        if let Err(reason) = check_origin(origin) {
            errors.push(ValidationError::InvalidOrigin {
                service,
                origin: origin.to_string(),
                reason,
            });
        }
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        if !route.path_prefix.starts_with('/') {
            errors.push(ValidationError::RelativePrefix(route.name.clone()));
        }
        if !seen.insert(route.path_prefix.trim_end_matches('/')) {
            errors.push(ValidationError::DuplicatePrefix(route.path_prefix.clone()));
        }
    }

    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_ms"));
    }
    if config.timeouts.connect_ms == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.connect_ms"));
    }

    if config.retries.enabled && config.retries.max_delay_ms < config.retries.retry_delay_ms {
        errors.push(ValidationError::DelayCapBelowBase {
            base: config.retries.retry_delay_ms,
            max: config.retries.max_delay_ms,
        });
    }

    if !config.graphql.endpoint.starts_with('/') {
        errors.push(ValidationError::RelativeGraphQlEndpoint(
            config.graphql.endpoint.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse an origin, accepting only absolute http(s) URLs with a host.
pub fn parse_origin(origin: &str) -> Result<Url, String> {
    let url = Url::parse(origin).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("origin must not carry a query or fragment".to_string());
    }
    Ok(url)
}

fn check_origin(origin: &str) -> Result<(), String> {
    parse_origin(origin).map(|_| ())
}
