//! GraphQL call path.
//!
//! # Responsibilities
//! - POST `{query, variables}` to the single GraphQL endpoint
//! - Distinguish transport failure from GraphQL-level `errors[]`
//! - Require `data` on success
//!
//! # Design Decisions
//! - Cookies are always carried on this path (dedicated transport)
//! - `errors[]` fails the call even when `data` is also present
//! - Never retried: queries and mutations share the endpoint

use std::time::Instant;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::http::client::ApiClient;
use crate::http::response::RawResponse;
use crate::resilience::timeouts::with_deadline;

/// Body sent to the GraphQL endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: &'a Value,
}

/// Location of a GraphQL error in the query document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GraphQlLocation {
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

/// One entry of a response's `errors[]`.
///
/// Fields sent as `null` decode to their empty value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphQlError {
    #[serde(default, deserialize_with = "lenient_message")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<GraphQlLocation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: Vec<Value>,
}

/// Decoded GraphQL response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<GraphQlError>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Strings pass through, `null` becomes empty, anything else is rendered as JSON.
fn lenient_message<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(message) => message,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl GraphQlResponse {
    /// Apply the success rules to a response received with `status`.
    pub fn into_data(self, status: u16) -> ApiResult<Value> {
        let ok = (200..300).contains(&status);

        if !ok || !self.errors.is_empty() {
            let mut messages: Vec<String> = self
                .errors
                .into_iter()
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .collect();
            if messages.is_empty() {
                messages.push(format!("GraphQL request failed with status {}", status));
            }
            return Err(ApiError::GraphQl { status, messages });
        }

        match self.data {
            Some(Value::Null) | None => Err(ApiError::MissingData),
            Some(data) => Ok(data),
        }
    }
}

fn decode(raw: RawResponse) -> ApiResult<Value> {
    let status = raw.status.as_u16();
    let body = raw.json()?;
    let response: GraphQlResponse = serde_json::from_value(body)
        .map_err(|e| ApiError::SchemaMismatch(format!("GraphQL response: {}", e)))?;
    response.into_data(status)
}

impl ApiClient {
    /// Run a GraphQL operation and decode its `data` into `T`.
    pub async fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> ApiResult<T> {
        self.graphql_with_headers(query, variables, HeaderMap::new()).await
    }

    /// Like [`graphql`](Self::graphql), with caller headers (e.g. `Authorization`).
    pub async fn graphql_with_headers<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        extra: HeaderMap,
    ) -> ApiResult<T> {
        let started = Instant::now();
        let endpoint = self.graphql_endpoint().to_string();
        let method = Method::POST;

        let url = match self.router().url_for(&endpoint) {
            Ok(url) => url,
            Err(err) => {
                self.emit(&method, &endpoint, None, 0, started, 0, Some(&err));
                return Err(err);
            }
        };

        let builder = self
            .transport()
            .graphql()
            .post(url.clone())
            .headers(self.merged_headers(false, &extra))
            .json(&GraphQlRequest {
                query,
                variables: &variables,
            });

        tracing::debug!(service = %self.service(), %url, "Sending GraphQL request");

        let (status, result) = match with_deadline(self.timeout(), Self::send_attempt(builder)).await {
            Ok(raw) => (raw.status.as_u16(), decode(raw)),
            Err(err) => (0, Err(err)),
        };

        let result = result.and_then(|data| {
            serde_json::from_value::<T>(data).map_err(|e| ApiError::SchemaMismatch(e.to_string()))
        });

        self.emit(
            &method,
            &endpoint,
            Some(url.as_str()),
            status,
            started,
            1,
            result.as_ref().err(),
        );
        result
    }
}
