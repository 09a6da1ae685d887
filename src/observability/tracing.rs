//! Trace correlation for outbound calls.
//!
//! # Responsibilities
//! - Hold the session's trace id, span id and request id
//! - Attach them as headers to every outbound request
//!
//! # Design Decisions
//! - One context per logical user session, shared by all service clients
//! - Caller-supplied headers are merged after these and win on conflict

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Header carrying the session trace id.
pub const TRACE_ID_HEADER: &str = "x-trace-id";
/// Header carrying the current span id.
pub const SPAN_ID_HEADER: &str = "x-span-id";
/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation identifiers attached to every outbound call.
///
/// The header values are checked when the context is built, so every
/// context can always produce all three headers.
#[derive(Debug, Clone)]
pub struct TraceContext {
    trace_id: String,
    span_id: String,
    request_id: String,
    headers: HeaderMap,
}

impl TraceContext {
    /// Start a new session with freshly generated identifiers.
    pub fn new_session() -> Self {
        let trace_id = Uuid::new_v4().to_string();
        let span_id = Uuid::new_v4().simple().to_string()[..16].to_string();
        let request_id = Uuid::new_v4().to_string();

        // Hex digits and dashes are always valid header values.
        let headers = [
            (TRACE_ID_HEADER, &trace_id),
            (SPAN_ID_HEADER, &span_id),
            (REQUEST_ID_HEADER, &request_id),
        ]
        .into_iter()
        .filter_map(|(name, id)| Some((HeaderName::from_static(name), HeaderValue::from_str(id).ok()?)))
        .collect();

        Self {
            trace_id,
            span_id,
            request_id,
            headers,
        }
    }

    /// Adopt identifiers propagated from elsewhere (e.g. a server-rendered page).
    ///
    /// Fails when an identifier cannot be sent as a header value.
    pub fn from_parts(
        trace_id: impl Into<String>,
        span_id: impl Into<String>,
        request_id: impl Into<String>,
    ) -> ApiResult<Self> {
        let (trace_id, span_id, request_id) = (trace_id.into(), span_id.into(), request_id.into());

        let mut headers = HeaderMap::with_capacity(3);
        for (name, id) in [
            (TRACE_ID_HEADER, &trace_id),
            (SPAN_ID_HEADER, &span_id),
            (REQUEST_ID_HEADER, &request_id),
        ] {
            if id.is_empty() {
                return Err(ApiError::InvalidRequest(format!("{} must not be empty", name)));
            }
            let value = HeaderValue::from_str(id)
                .map_err(|_| ApiError::InvalidRequest(format!("{} is not a valid header value", name)))?;
            headers.insert(HeaderName::from_static(name), value);
        }

        Ok(Self {
            trace_id,
            span_id,
            request_id,
            headers,
        })
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Header map carrying the three identifiers.
    pub fn headers(&self) -> HeaderMap {
        self.headers.clone()
    }
}

impl PartialEq for TraceContext {
    fn eq(&self, other: &Self) -> bool {
        self.trace_id == other.trace_id
            && self.span_id == other.span_id
            && self.request_id == other.request_id
    }
}

impl Eq for TraceContext {}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new_session()
    }
}
