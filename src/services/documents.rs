//! Document endpoints (`/api/documents*`).

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::http::client::ApiClient;
use crate::services::path_segment;
use crate::services::types::{CreateDocument, DocumentQuery, DocumentRecord, DocumentsPage};

impl ApiClient {
    pub async fn list_documents(&self, query: &DocumentQuery) -> ApiResult<DocumentsPage> {
        let qs = query.to_query_string();
        let endpoint = if qs.is_empty() {
            "/api/documents".to_string()
        } else {
            format!("/api/documents?{}", qs)
        };
        self.get(endpoint).send_enveloped().await
    }

    pub async fn get_document(&self, id: &str) -> ApiResult<DocumentRecord> {
        self.get(format!("/api/documents/{}", path_segment(id)?)).send_enveloped().await
    }

    pub async fn create_document(&self, document: &CreateDocument) -> ApiResult<DocumentRecord> {
        self.post("/api/documents").json(document).send_enveloped().await
    }

    pub async fn delete_document(&self, id: &str) -> ApiResult<Value> {
        self.delete(format!("/api/documents/{}", path_segment(id)?)).send_value().await
    }

    /// Multipart upload of a file's bytes under the `file` field.
    pub async fn upload_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> ApiResult<DocumentRecord> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid mime type '{}': {}", mime, e)))?;
        let form = Form::new().part("file", part);

        self.post_form("/api/documents/upload", form).send_enveloped().await
    }
}
