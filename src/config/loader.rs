//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{ClientConfig, Service};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Environment variables consulted for each service origin, highest priority first.
pub fn origin_env_keys(service: Service) -> &'static [&'static str] {
    match service {
        Service::Backend => &["CONHUB_API_URL", "NEXT_PUBLIC_API_URL"],
        Service::Auth => &[
            "CONHUB_AUTH_SERVICE_URL",
            "NEXT_PUBLIC_AUTH_SERVICE_URL",
            "AUTH_SERVICE_URL",
        ],
        Service::Data => &["CONHUB_DATA_SERVICE_URL", "NEXT_PUBLIC_DATA_SERVICE_URL"],
        Service::Billing => &[
            "CONHUB_BILLING_SERVICE_URL",
            "NEXT_PUBLIC_BILLING_SERVICE_URL",
            "BILLING_SERVICE_URL",
        ],
        Service::Security => &[
            "CONHUB_SECURITY_SERVICE_URL",
            "NEXT_PUBLIC_SECURITY_SERVICE_URL",
        ],
    }
}

/// Override service origins from environment lookups.
///
/// The first non-empty variable in [`origin_env_keys`] wins for each service.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for service in Service::ALL {
        let found = origin_env_keys(service)
            .iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()).map(|v| (*key, v)));

        if let Some((key, value)) = found {
            tracing::debug!(service = %service, env = key, origin = %value, "Service origin overridden from environment");
            *config.services.origin_mut(service) = value.trim().to_string();
        }
    }
}

/// Build the effective configuration: optional file, then process environment.
pub fn load(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    load_with_env(path, |key| std::env::var(key).ok())
}

/// Like [`load`], with origin overrides read through `lookup`.
pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ClientConfig::default(),
    };

    apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
