//! Synchronous agent runs and agent lookups.
//!
//! The run endpoints block until the model answers, so they use the
//! long-running timeout. For large inputs prefer the async task client.

use serde::Deserialize;
use tracing::info;

use super::types::{
    AgentListResponse, AgentRunResponse, LabeledOption, RequirementAnalysisRequest,
    TaskLogResponse, TestCaseOptimizationRequest,
};
use crate::http::{ApiError, RequestOptions, Transport};
use crate::task::TestPointGenerationRequest;

pub struct AgentsApi<'a> {
    transport: &'a Transport,
}

#[derive(Deserialize)]
struct AgentTypes {
    agent_types: Vec<LabeledOption>,
}

#[derive(Deserialize)]
struct TestTypes {
    test_types: Vec<LabeledOption>,
}

#[derive(Deserialize)]
struct DesignMethods {
    design_methods: Vec<LabeledOption>,
}

impl<'a> AgentsApi<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    async fn run<B: serde::Serialize>(
        &self,
        path: &str,
        request: &B,
    ) -> Result<AgentRunResponse, ApiError> {
        let response: AgentRunResponse = self
            .transport
            .post_with(path, request, self.transport.long_running())
            .await?;
        info!(path = %path, success = response.success, "Agent run finished");
        Ok(response)
    }

    pub async fn analyze_requirements(
        &self,
        request: &RequirementAnalysisRequest,
    ) -> Result<AgentRunResponse, ApiError> {
        self.run("/api/agents/requirement-analysis", request).await
    }

    pub async fn generate_test_points(
        &self,
        request: &TestPointGenerationRequest,
    ) -> Result<AgentRunResponse, ApiError> {
        self.run("/api/agents/test-point-generation", request).await
    }

    pub async fn optimize_test_cases(
        &self,
        request: &TestCaseOptimizationRequest,
    ) -> Result<AgentRunResponse, ApiError> {
        self.run("/api/agents/test-case-optimization", request).await
    }

    pub async fn list(&self) -> Result<AgentListResponse, ApiError> {
        self.transport.get("/api/agents/list").await
    }

    pub async fn types(&self) -> Result<Vec<LabeledOption>, ApiError> {
        let types: AgentTypes = self.transport.get("/api/agents/types").await?;
        Ok(types.agent_types)
    }

    /// Enabled test categories, as configured in system settings.
    pub async fn test_types(&self) -> Result<Vec<LabeledOption>, ApiError> {
        let types: TestTypes = self.transport.get("/api/agents/test-types").await?;
        Ok(types.test_types)
    }

    /// Enabled test design methods, as configured in system settings.
    pub async fn design_methods(&self) -> Result<Vec<LabeledOption>, ApiError> {
        let methods: DesignMethods = self.transport.get("/api/agents/design-methods").await?;
        Ok(methods.design_methods)
    }

    pub async fn task_logs(
        &self,
        agent_id: Option<i64>,
        limit: Option<u32>,
    ) -> Result<TaskLogResponse, ApiError> {
        let options = RequestOptions::new()
            .query_opt("agent_id", agent_id)
            .query_opt("limit", limit);
        self.transport.get_with("/api/agents/task-logs", options).await
    }
}
