//! Route matching logic.
//!
//! # Responsibilities
//! - Match endpoint path prefix (case-sensitive)
//! - Respect path-segment boundaries
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Query strings are ignored when matching
//! - No regex to guarantee O(n) matching

/// Trait for matching endpoint paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the endpoint matches this condition.
    fn matches(&self, endpoint: &str) -> bool;
}

/// Matches the endpoint path prefix on segment boundaries.
///
/// `/api/auth` matches `/api/auth`, `/api/auth/` and `/api/auth/github`,
/// but not `/api/authors`.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher. Trailing slashes are ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: trimmed.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, endpoint: &str) -> bool {
        let path = endpoint
            .split(['?', '#'])
            .next()
            .unwrap_or(endpoint);

        match path.strip_prefix(&self.prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix.is_empty(),
            None => false,
        }
    }
}
