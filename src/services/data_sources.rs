//! Data source endpoints (`/api/data-sources*`).

use serde_json::Value;

use crate::error::ApiResult;
use crate::http::client::ApiClient;
use crate::services::path_segment;
use crate::services::types::{ConnectDataSource, DataSource, HealthStatus};

impl ApiClient {
    pub async fn list_data_sources(&self) -> ApiResult<Vec<DataSource>> {
        self.get("/api/data-sources").send_enveloped().await
    }

    pub async fn connect_data_source(&self, source: &ConnectDataSource) -> ApiResult<DataSource> {
        self.post("/api/data-sources/connect")
            .json(source)
            .send_enveloped()
            .await
    }

    /// Ask the backend to re-ingest a source. The reply shape varies by connector.
    pub async fn sync_data_source(&self, id: &str) -> ApiResult<Value> {
        self.post(format!("/api/data-sources/{}/sync", path_segment(id)?))
            .send_enveloped()
            .await
    }

    pub async fn health(&self) -> ApiResult<HealthStatus> {
        self.get("/health").send_enveloped().await
    }
}
