//! Error taxonomy for calls made through the client layer.
//!
//! # Categories
//! - Transport: the request never produced an HTTP response (`Network`, `Timeout`)
//! - Parse: the body was not valid JSON
//! - Application (REST): non-2xx status or an envelope with `success: false`
//! - Application (GraphQL): `errors[]` present or `data` missing
//! - Boundary: the payload did not match the expected type

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::config::loader::ConfigError;

/// Errors surfaced by [`ApiClient`](crate::http::ApiClient) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport failed before a response arrived (DNS, refused, reset).
    #[error("{0}")]
    Network(String),

    /// The per-attempt deadline elapsed.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The response body was not valid JSON.
    #[error("Failed to parse response: {status_text}")]
    Parse { status: u16, status_text: String },

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        body: Value,
    },

    /// The GraphQL endpoint reported errors.
    #[error("{}", messages.join("\n"))]
    GraphQl { status: u16, messages: Vec<String> },

    /// A GraphQL response without a `data` field.
    #[error("GraphQL response contained no data")]
    MissingData,

    /// An envelope with `success: false`.
    #[error("{0}")]
    Application(String),

    /// The payload could not be decoded into the expected type.
    #[error("Response did not match expected schema: {0}")]
    SchemaMismatch(String),

    /// The request could not be built (bad header, bad URL, unserializable body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The client could not be constructed from its configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// HTTP status associated with the failure, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Parse { status, .. }
            | ApiError::Http { status, .. }
            | ApiError::GraphQl { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when no HTTP response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout(_))
    }
}

/// Result type for client operations.
pub type ApiResult<T> = Result<T, ApiError>;
