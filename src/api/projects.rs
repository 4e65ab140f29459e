//! Projects, members and project-wide test case views.
//!
//! The `admin_*` calls go through `/api/projects/admin` and ignore project
//! membership; the server answers 403 unless the caller is an administrator.

use serde_json::{json, Value};

use super::types::{
    BatchDeleteResponse, MessageResponse, Project, ProjectDetail, ProjectListParams,
    ProjectListResponse, ProjectMember, ProjectMemberRequest, ProjectRequest, ProjectStats,
    ProjectTestCaseFilter, TestCaseDraft,
};
use crate::http::{ApiError, Transport};

pub struct ProjectsApi<'a> {
    transport: &'a Transport,
}

impl<'a> ProjectsApi<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    pub async fn list(&self, params: &ProjectListParams) -> Result<ProjectListResponse, ApiError> {
        self.transport
            .get_with("/api/projects", params.to_options())
            .await
    }

    pub async fn get(&self, project_id: i64) -> Result<ProjectDetail, ApiError> {
        self.transport
            .get(&format!("/api/projects/{}", project_id))
            .await
    }

    pub async fn create(&self, request: &ProjectRequest) -> Result<Project, ApiError> {
        self.transport.post("/api/projects", request).await
    }

    pub async fn update(
        &self,
        project_id: i64,
        request: &ProjectRequest,
    ) -> Result<Project, ApiError> {
        self.transport
            .put(&format!("/api/projects/{}", project_id), request)
            .await
    }

    pub async fn delete(&self, project_id: i64) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&format!("/api/projects/{}", project_id))
            .await
    }

    pub async fn add_member(
        &self,
        project_id: i64,
        request: &ProjectMemberRequest,
    ) -> Result<ProjectMember, ApiError> {
        self.transport
            .post(&format!("/api/projects/{}/members", project_id), request)
            .await
    }

    pub async fn members(&self, project_id: i64) -> Result<Vec<ProjectMember>, ApiError> {
        self.transport
            .get(&format!("/api/projects/{}/members", project_id))
            .await
    }

    pub async fn remove_member(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&format!("/api/projects/{}/members/{}", project_id, user_id))
            .await
    }

    pub async fn stats(&self, project_id: i64) -> Result<ProjectStats, ApiError> {
        self.transport
            .get(&format!("/api/projects/{}/stats", project_id))
            .await
    }

    /// Test cases across all modules of a project.
    pub async fn test_cases(
        &self,
        project_id: i64,
        filter: &ProjectTestCaseFilter,
    ) -> Result<Vec<Value>, ApiError> {
        self.transport
            .get_with(
                &format!("/api/projects/{}/test-cases", project_id),
                filter.to_options(),
            )
            .await
    }

    pub async fn update_test_case(
        &self,
        project_id: i64,
        case_id: i64,
        update: &TestCaseDraft,
    ) -> Result<Value, ApiError> {
        self.transport
            .put(
                &format!("/api/projects/{}/test-cases/{}", project_id, case_id),
                update,
            )
            .await
    }

    pub async fn delete_test_case(&self, project_id: i64, case_id: i64) -> Result<Value, ApiError> {
        self.transport
            .delete(&format!("/api/projects/{}/test-cases/{}", project_id, case_id))
            .await
    }

    pub async fn delete_test_cases(
        &self,
        project_id: i64,
        ids: &[i64],
    ) -> Result<BatchDeleteResponse, ApiError> {
        self.transport
            .delete_with_body(
                &format!("/api/projects/{}/test-cases/batch", project_id),
                &json!({ "ids": ids }),
            )
            .await
    }

    // Administrator views

    pub async fn admin_list(
        &self,
        params: &ProjectListParams,
    ) -> Result<ProjectListResponse, ApiError> {
        self.transport
            .get_with("/api/projects/admin", params.to_options())
            .await
    }

    pub async fn admin_create(&self, request: &ProjectRequest) -> Result<Project, ApiError> {
        self.transport.post("/api/projects/admin", request).await
    }

    pub async fn admin_get(&self, project_id: i64) -> Result<ProjectDetail, ApiError> {
        self.transport
            .get(&format!("/api/projects/admin/{}", project_id))
            .await
    }

    pub async fn admin_delete(&self, project_id: i64) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&format!("/api/projects/admin/{}", project_id))
            .await
    }

    pub async fn admin_add_member(
        &self,
        project_id: i64,
        request: &ProjectMemberRequest,
    ) -> Result<ProjectMember, ApiError> {
        self.transport
            .post(&format!("/api/projects/admin/{}/members", project_id), request)
            .await
    }

    pub async fn admin_members(&self, project_id: i64) -> Result<Vec<ProjectMember>, ApiError> {
        self.transport
            .get(&format!("/api/projects/admin/{}/members", project_id))
            .await
    }

    pub async fn admin_remove_member(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&format!(
                "/api/projects/admin/{}/members/{}",
                project_id, user_id
            ))
            .await
    }
}
