//! Domain convenience layer.
//!
//! # Data Flow
//! ```text
//! Caller (CLI, application code)
//!     → registry.rs (pick the client for a service)
//!     → documents.rs / urls.rs / agents.rs / data_sources.rs (fixed paths, typed DTOs)
//!     → connections.rs (auth + security fan-out and merge)
//!     → http::ApiClient core verbs
//! ```
//!
//! # Design Decisions
//! - No retries, caching or extra validation at this layer
//! - DTOs tolerate unknown fields

pub mod agents;
pub mod connections;
pub mod data_sources;
pub mod documents;
pub mod registry;
pub mod types;
pub mod urls;

pub use registry::ServiceRegistry;

use std::borrow::Cow;

use crate::error::{ApiError, ApiResult};

/// Percent-encode a resource id as exactly one path segment.
///
/// Dot segments are rejected; URL normalization would resolve them away.
pub(crate) fn path_segment(id: &str) -> ApiResult<Cow<'_, str>> {
    match id {
        "" | "." | ".." => Err(ApiError::InvalidRequest(format!("invalid resource id '{}'", id))),
        _ => Ok(urlencoding::encode(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segment_encoding() {
        assert_eq!(path_segment("doc-42").unwrap(), "doc-42");
        assert_eq!(path_segment("a?b").unwrap(), "a%3Fb");
        assert_eq!(path_segment("../x").unwrap(), "..%2Fx");
        assert_eq!(path_segment("a b#c").unwrap(), "a%20b%23c");
    }

    #[test]
    fn test_path_segment_rejects_dot_segments() {
        for id in ["", ".", ".."] {
            assert!(matches!(path_segment(id), Err(ApiError::InvalidRequest(_))));
        }
    }
}
