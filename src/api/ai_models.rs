//! AI model endpoints and agent configuration.

use serde_json::json;

use super::types::{
    AgentConfig, AgentConfigRequest, AiModel, AiModelRequest, AiModelTestResult,
    MessageResponse, Page,
};
use crate::http::{ApiError, Transport};

pub struct AiModelsApi<'a> {
    transport: &'a Transport,
}

impl<'a> AiModelsApi<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    pub async fn list(&self, page: Page, is_active: Option<bool>) -> Result<Vec<AiModel>, ApiError> {
        let options = page.to_options().query_opt("is_active", is_active);
        self.transport.get_with("/api/ai/models", options).await
    }

    /// Model detail, including its API key.
    pub async fn get(&self, model_id: i64) -> Result<AiModel, ApiError> {
        self.transport
            .get(&format!("/api/ai/models/{}", model_id))
            .await
    }

    pub async fn create(&self, request: &AiModelRequest) -> Result<AiModel, ApiError> {
        self.transport.post("/api/ai/models", request).await
    }

    pub async fn update(&self, model_id: i64, request: &AiModelRequest) -> Result<AiModel, ApiError> {
        self.transport
            .put(&format!("/api/ai/models/{}", model_id), request)
            .await
    }

    pub async fn delete(&self, model_id: i64) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&format!("/api/ai/models/{}", model_id))
            .await
    }

    /// Send a probe message through the model. A failed probe is reported in
    /// the result body, not as an error.
    pub async fn test(
        &self,
        model_id: i64,
        message: Option<&str>,
    ) -> Result<AiModelTestResult, ApiError> {
        let body = match message {
            Some(m) => json!({ "message": m }),
            None => json!({}),
        };
        self.transport
            .post_with(
                &format!("/api/ai/models/{}/test", model_id),
                &body,
                self.transport.long_running(),
            )
            .await
    }

    pub async fn agents(&self, page: Page) -> Result<Vec<AgentConfig>, ApiError> {
        self.transport
            .get_with("/api/ai/agents", page.to_options())
            .await
    }

    pub async fn create_agent(&self, request: &AgentConfigRequest) -> Result<AgentConfig, ApiError> {
        self.transport.post("/api/ai/agents", request).await
    }

    pub async fn update_agent(
        &self,
        agent_id: i64,
        request: &AgentConfigRequest,
    ) -> Result<AgentConfig, ApiError> {
        self.transport
            .put(&format!("/api/ai/agents/{}", agent_id), request)
            .await
    }

    pub async fn delete_agent(&self, agent_id: i64) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&format!("/api/ai/agents/{}", agent_id))
            .await
    }
}
