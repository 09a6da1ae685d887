//! Data transfer objects mirrored from backend schemas.
//!
//! The client only transports these; unknown fields are kept in `extra`
//! so newer backends do not break older clients.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document indexed by the backend.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentRecord {
    pub id: String,
    pub name: String,
    /// Origin of the document (`upload`, `google_drive`, `dropbox`, ...).
    pub source: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of documents.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentsPage {
    pub data: Vec<DocumentRecord>,
    pub total: u64,
}

/// Filters for listing documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    pub search: Option<String>,
    pub source: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl DocumentQuery {
    /// Query string (without `?`), empty when no filter is set.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(search) = &self.search {
            serializer.append_pair("search", search);
        }
        if let Some(source) = &self.source {
            serializer.append_pair("source", source);
        }
        if let Some(limit) = self.limit {
            serializer.append_pair("limit", &limit.to_string());
        }
        if let Some(offset) = self.offset {
            serializer.append_pair("offset", &offset.to_string());
        }
        serializer.finish()
    }
}

/// Body for creating a document from inline content.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateDocument {
    pub name: String,
    pub source: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub tags: Vec<String>,
}

/// A URL submitted for crawling.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UrlRecord {
    pub id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body for adding a URL.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// An AI agent registered with the backend.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    pub agent_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub status: String,
    pub permissions: Vec<String>,
    pub config: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body for registering an agent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateAgent {
    pub name: String,
    pub agent_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub permissions: Vec<String>,
    pub config: Value,
}

/// Partial update of an agent; unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateAgent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

/// Message sent to an agent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentInvocation {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// Agent reply.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentReply {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A connected third-party content source.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DataSource {
    pub id: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
    pub config: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body for connecting a data source.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectDataSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub name: String,
    pub credentials: Value,
    pub config: Value,
}

/// Platform connection as reported by the auth or security service.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Connection {
    pub platform: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `/health` response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_preserved() {
        let doc: DocumentRecord = serde_json::from_value(json!({
            "id": "d1",
            "name": "README.md",
            "source": "github",
            "type": "markdown",
            "chunk_count": 12
        }))
        .unwrap();
        assert_eq!(doc.doc_type, "markdown");
        assert_eq!(doc.extra["chunk_count"], 12);
        assert!(doc.tags.is_empty());
    }

    #[test]
    fn test_document_query_string() {
        assert_eq!(DocumentQuery::default().to_query_string(), "");

        let query = DocumentQuery {
            search: Some("design doc".into()),
            limit: Some(20),
            ..DocumentQuery::default()
        };
        assert_eq!(query.to_query_string(), "search=design+doc&limit=20");
    }

    #[test]
    fn test_update_agent_skips_unset() {
        let body = serde_json::to_value(UpdateAgent {
            status: Some("inactive".into()),
            ..UpdateAgent::default()
        })
        .unwrap();
        assert_eq!(body, json!({"status": "inactive"}));
    }
}
