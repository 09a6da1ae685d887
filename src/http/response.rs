//! Response handling and normalization.
//!
//! # Responsibilities
//! - Parse response bodies as JSON (no text or binary fallback)
//! - Extract error messages from failed responses
//! - Unwrap `data` from enveloped and bare payloads
//! - Classify payloads at the boundary into a strict union
//!
//! # Design Decisions
//! - An empty body is a parse failure like any other invalid JSON
//! - `error` wins over `message` when both are present
//! - Envelope detection keys on a boolean `success` field

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Canonical envelope used by most backend endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A decoded payload: either an envelope or the bare value.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    Enveloped(ApiResponse<T>),
    Bare(T),
}

impl<T: DeserializeOwned> Payload<T> {
    /// Classify and decode a JSON value.
    ///
    /// Objects carrying a boolean `success` key are envelopes; anything
    /// else is decoded directly as `T`.
    pub fn classify(value: Value) -> ApiResult<Self> {
        let enveloped = value
            .as_object()
            .and_then(|obj| obj.get("success"))
            .is_some_and(Value::is_boolean);

        if enveloped {
            serde_json::from_value::<ApiResponse<T>>(value)
                .map(Payload::Enveloped)
                .map_err(|e| ApiError::SchemaMismatch(format!("envelope: {}", e)))
        } else {
            serde_json::from_value::<T>(value)
                .map(Payload::Bare)
                .map_err(|e| ApiError::SchemaMismatch(e.to_string()))
        }
    }

    /// Collapse into the payload value or an application error.
    pub fn into_result(self) -> ApiResult<T> {
        match self {
            Payload::Bare(value) => Ok(value),
            Payload::Enveloped(envelope) if envelope.success => match envelope.data {
                Some(data) => Ok(data),
                None => serde_json::from_value::<T>(Value::Null).map_err(|_| {
                    ApiError::SchemaMismatch("successful envelope carried no data".to_string())
                }),
            },
            Payload::Enveloped(envelope) => {
                let message = envelope
                    .error
                    .filter(|e| !e.is_empty())
                    .or_else(|| Some(envelope.message).filter(|m| !m.is_empty()))
                    .unwrap_or_else(|| "request was not successful".to_string());
                Err(ApiError::Application(message))
            }
        }
    }
}

/// Decode a JSON value through the strict envelope classifier.
pub fn decode_payload<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    Payload::<T>::classify(value)?.into_result()
}

/// Return `data` from an object that has it, otherwise the value itself.
pub fn unwrap_response(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if obj.contains_key("data") => {
            obj.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Raw outcome of one HTTP attempt.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Reason phrase for the status, empty when the code has none.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> ApiResult<Value> {
        serde_json::from_slice(&self.body).map_err(|_| ApiError::Parse {
            status: self.status.as_u16(),
            status_text: self.status_text().to_string(),
        })
    }

    /// Parse the body and turn non-2xx statuses into [`ApiError::Http`].
    pub fn into_json(self) -> ApiResult<Value> {
        let body = self.json()?;
        if !self.status.is_success() {
            return Err(ApiError::Http {
                status: self.status.as_u16(),
                message: error_message(self.status, &body),
                body,
            });
        }
        Ok(body)
    }
}

/// Message for a failed response: `error`, then `message`, then a generic one.
pub fn error_message(status: StatusCode, body: &Value) -> String {
    let field = |name: &str| -> Option<String> {
        match body.get(name)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(inner) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    };

    field("error")
        .or_else(|| field("message"))
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}
