//! URL endpoints (`/api/urls*`).

use serde_json::Value;

use crate::error::ApiResult;
use crate::http::client::ApiClient;
use crate::services::path_segment;
use crate::services::types::{CreateUrl, UrlRecord};

impl ApiClient {
    pub async fn list_urls(&self) -> ApiResult<Vec<UrlRecord>> {
        self.get("/api/urls").send_enveloped().await
    }

    pub async fn add_url(&self, url: &CreateUrl) -> ApiResult<UrlRecord> {
        self.post("/api/urls").json(url).send_enveloped().await
    }

    pub async fn delete_url(&self, id: &str) -> ApiResult<Value> {
        self.delete(format!("/api/urls/{}", path_segment(id)?)).send_value().await
    }
}
