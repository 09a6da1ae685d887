//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides for service origins)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → consumed once by ServiceRegistry::from_config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the endpoint map is fixed per client
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_with_env, ConfigError};
pub use schema::ClientConfig;
pub use schema::GraphQlConfig;
pub use schema::ObservabilityConfig;
pub use schema::RetryConfig;
pub use schema::RouteConfig;
pub use schema::Service;
pub use schema::ServicesConfig;
pub use schema::TimeoutConfig;
