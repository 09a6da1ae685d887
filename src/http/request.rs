//! Request construction.
//!
//! # Responsibilities
//! - Collect endpoint, body, caller headers and deadline override
//! - Serialize JSON bodies once, replayable across retries
//! - Hand the call to the client core and decode the result
//!
//! # Design Decisions
//! - Build errors are deferred to send time so they are logged like any failure
//! - Multipart bodies are consumed by the first attempt and never retried

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::http::client::ApiClient;
use crate::http::response::decode_payload;

/// Body of an outbound request.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Pre-serialized JSON, cloned for every attempt.
    Json(Vec<u8>),
    /// Multipart form, taken by the first attempt.
    Form(Option<Form>),
    /// The body could not be built; reported when the call is sent.
    Invalid(String),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Form(_))
    }

    /// Attach the body for one attempt.
    pub(crate) fn apply(&mut self, builder: RequestBuilder) -> ApiResult<RequestBuilder> {
        match self {
            RequestBody::Empty => Ok(builder),
            RequestBody::Json(bytes) => Ok(builder.body(bytes.clone())),
            RequestBody::Form(form) => form
                .take()
                .map(|form| builder.multipart(form))
                .ok_or_else(|| ApiError::InvalidRequest("multipart body already sent".to_string())),
            RequestBody::Invalid(reason) => Err(ApiError::InvalidRequest(reason.clone())),
        }
    }
}

/// A pending call on an [`ApiClient`].
#[must_use = "requests do nothing until sent"]
#[derive(Debug)]
pub struct ApiRequest<'a> {
    client: &'a ApiClient,
    method: Method,
    endpoint: String,
    body: RequestBody,
    headers: HeaderMap,
    timeout: Option<Duration>,
    invalid_header: Option<String>,
}

impl<'a> ApiRequest<'a> {
    pub(crate) fn new(client: &'a ApiClient, method: Method, endpoint: String) -> Self {
        Self {
            client,
            method,
            endpoint,
            body: RequestBody::Empty,
            headers: HeaderMap::new(),
            timeout: None,
            invalid_header: None,
        }
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = match serde_json::to_vec(body) {
            Ok(bytes) => RequestBody::Json(bytes),
            Err(e) => RequestBody::Invalid(format!("failed to serialize body: {}", e)),
        };
        self
    }

    pub(crate) fn form(mut self, form: Form) -> Self {
        self.body = RequestBody::Form(Some(form));
        self
    }

    /// Add one header; it overrides defaults and trace headers of the same name.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                self.invalid_header = Some(name.to_string());
            }
        }
        self
    }

    /// Merge a header map; later values replace earlier ones.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in &headers {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    /// `Authorization: Bearer <token>`.
    pub fn bearer_auth(mut self, token: &str) -> Self {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => self.invalid_header = Some(AUTHORIZATION.to_string()),
        }
        self
    }

    /// Override the client's per-attempt deadline for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send and return the JSON body exactly as received.
    pub async fn send_value(self) -> ApiResult<Value> {
        let body = match self.invalid_header {
            Some(name) => RequestBody::Invalid(format!("invalid header '{}'", name)),
            None => self.body,
        };
        self.client
            .execute(self.method, &self.endpoint, body, &self.headers, self.timeout)
            .await
    }

    /// Send and decode the JSON body into `T` without unwrapping.
    pub async fn send<T: DeserializeOwned>(self) -> ApiResult<T> {
        let value = self.send_value().await?;
        serde_json::from_value(value).map_err(|e| ApiError::SchemaMismatch(e.to_string()))
    }

    /// Send and decode through the strict envelope classifier.
    pub async fn send_enveloped<T: DeserializeOwned>(self) -> ApiResult<T> {
        let value = self.send_value().await?;
        decode_payload(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Service;

    fn client() -> ApiClient {
        ApiClient::new(Service::Backend, "http://localhost:3001").unwrap()
    }

    #[test]
    fn test_json_body_is_replayable() {
        let client = client();
        let mut body = client.post("/api/urls").json(&serde_json::json!({"url": "https://conhub.dev"})).body;
        let transport = reqwest::Client::new();

        for _ in 0..2 {
            let builder = transport.post("http://localhost:3001/api/urls");
            let request = body.apply(builder).unwrap().build().unwrap();
            let sent = request.body().and_then(|b| b.as_bytes()).unwrap();
            assert_eq!(sent, br#"{"url":"https://conhub.dev"}"#);
        }
    }

    #[test]
    fn test_form_body_taken_once() {
        let mut body = RequestBody::Form(Some(Form::new().text("name", "notes.md")));
        assert!(body.is_multipart());

        let transport = reqwest::Client::new();
        assert!(body.apply(transport.post("http://localhost:3001/upload")).is_ok());
        let err = body.apply(transport.post("http://localhost:3001/upload")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn test_invalid_header_recorded() {
        let client = client();
        let request = client.get("/health").header("bad header", "x");
        assert_eq!(request.invalid_header.as_deref(), Some("bad header"));

        let request = client.get("/health").bearer_auth("abc");
        assert_eq!(request.headers[AUTHORIZATION], "Bearer abc");
        assert!(request.headers[AUTHORIZATION].is_sensitive());
    }
}
