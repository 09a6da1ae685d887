//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing call (endpoint path)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate prefix conditions)
//!     → Return: matched origin or the client's default origin
//!
//! Route Compilation (at client construction):
//!     RouteConfig[] + ServicesConfig
//!     → Parse origins
//!     → Compile prefix matchers
//!     → Freeze as immutable ServiceRouter
//! ```
//!
//! # Design Decisions
//! - Routes compiled at construction, immutable at runtime
//! - No regex (prefix matching only)
//! - Deterministic: same input always resolves to the same origin
//! - First match wins (declaration order)

pub mod matcher;
pub mod router;

pub use router::{Route, ServiceRouter};
