//! Agent endpoints (`/api/agents*`).

use serde_json::Value;

use crate::error::ApiResult;
use crate::http::client::ApiClient;
use crate::services::path_segment;
use crate::services::types::{AgentInvocation, AgentRecord, AgentReply, CreateAgent, UpdateAgent};

impl ApiClient {
    pub async fn list_agents(&self) -> ApiResult<Vec<AgentRecord>> {
        self.get("/api/agents").send_enveloped().await
    }

    pub async fn get_agent(&self, id: &str) -> ApiResult<AgentRecord> {
        self.get(format!("/api/agents/{}", path_segment(id)?)).send_enveloped().await
    }

    pub async fn create_agent(&self, agent: &CreateAgent) -> ApiResult<AgentRecord> {
        self.post("/api/agents").json(agent).send_enveloped().await
    }

    pub async fn update_agent(&self, id: &str, update: &UpdateAgent) -> ApiResult<AgentRecord> {
        self.put(format!("/api/agents/{}", path_segment(id)?)).json(update).send_enveloped().await
    }

    pub async fn delete_agent(&self, id: &str) -> ApiResult<Value> {
        self.delete(format!("/api/agents/{}", path_segment(id)?)).send_value().await
    }

    pub async fn invoke_agent(&self, id: &str, invocation: &AgentInvocation) -> ApiResult<AgentReply> {
        self.post(format!("/api/agents/{}/invoke", path_segment(id)?))
            .json(invocation)
            .send_enveloped()
            .await
    }
}
