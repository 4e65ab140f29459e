//! Requirement files, requirement points, test points and test cases within
//! one module.
//!
//! Create and update calls for requirement points and single test points take
//! their fields as query parameters, matching the server's signature.

use serde_json::{json, Value};

use super::types::{
    BatchCreateResponse, MessageResponse, RequirementFile, RequirementFileContent,
    RequirementPoint, RequirementPointEdit, TestCaseDraft, TestPointDraft, TestPointEdit,
};
use crate::http::{ApiError, Transport};

pub struct RequirementsApi<'a> {
    transport: &'a Transport,
    project_id: i64,
    module_id: i64,
}

impl<'a> RequirementsApi<'a> {
    pub(crate) fn new(transport: &'a Transport, project_id: i64, module_id: i64) -> Self {
        Self {
            transport,
            project_id,
            module_id,
        }
    }

    fn path(&self, suffix: &str) -> String {
        format!(
            "/api/projects/{}/modules/{}/{}",
            self.project_id, self.module_id, suffix
        )
    }

    // Requirement files

    /// Files uploaded to this module, newest first.
    pub async fn files(&self) -> Result<Vec<RequirementFile>, ApiError> {
        self.transport.get(&self.path("requirements/files")).await
    }

    /// Extracted text of a file together with its requirement points and images.
    ///
    /// Files are addressed per project; the module is not part of the path.
    pub async fn file_content(&self, file_id: i64) -> Result<RequirementFileContent, ApiError> {
        self.transport
            .get(&format!(
                "/api/projects/{}/requirements/files/{}/content",
                self.project_id, file_id
            ))
            .await
    }

    pub async fn delete_file(&self, file_id: i64) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&self.path(&format!("requirements/files/{}", file_id)))
            .await
    }

    // Requirement points

    pub async fn requirement_points(&self) -> Result<Vec<RequirementPoint>, ApiError> {
        self.transport.get(&self.path("requirement-points")).await
    }

    pub async fn create_requirement_point(
        &self,
        edit: &RequirementPointEdit,
    ) -> Result<RequirementPoint, ApiError> {
        self.transport
            .post_empty(&self.path("requirement-points"), edit.to_options())
            .await
    }

    pub async fn update_requirement_point(
        &self,
        point_id: i64,
        edit: &RequirementPointEdit,
    ) -> Result<RequirementPoint, ApiError> {
        self.transport
            .put_query(
                &self.path(&format!("requirement-points/{}", point_id)),
                edit.to_options(),
            )
            .await
    }

    pub async fn delete_requirement_point(
        &self,
        point_id: i64,
    ) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&self.path(&format!("requirement-points/{}", point_id)))
            .await
    }

    // Test points

    /// Test points grouped under their requirement points, with statistics.
    pub async fn test_points(&self) -> Result<Value, ApiError> {
        self.transport.get(&self.path("test-points")).await
    }

    pub async fn create_test_point(&self, edit: &TestPointEdit) -> Result<Value, ApiError> {
        self.transport
            .post_empty(&self.path("test-points"), edit.to_options())
            .await
    }

    pub async fn create_test_points(
        &self,
        points: &[TestPointDraft],
        clear_existing: bool,
    ) -> Result<BatchCreateResponse, ApiError> {
        self.transport
            .post(
                &self.path("test-points/batch"),
                &json!({ "points": points, "clear_existing": clear_existing }),
            )
            .await
    }

    pub async fn update_test_point(
        &self,
        point_id: i64,
        edit: &TestPointEdit,
    ) -> Result<Value, ApiError> {
        self.transport
            .put_query(
                &self.path(&format!("test-points/{}", point_id)),
                edit.to_options(),
            )
            .await
    }

    pub async fn delete_test_point(&self, point_id: i64) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&self.path(&format!("test-points/{}", point_id)))
            .await
    }

    // Test cases

    /// Test cases grouped under their test points, with totals.
    pub async fn test_cases(&self) -> Result<Value, ApiError> {
        self.transport.get(&self.path("test-cases")).await
    }

    pub async fn create_test_case(&self, draft: &TestCaseDraft) -> Result<Value, ApiError> {
        self.transport.post(&self.path("test-cases"), draft).await
    }

    pub async fn create_test_cases(
        &self,
        drafts: &[TestCaseDraft],
        clear_existing: bool,
    ) -> Result<BatchCreateResponse, ApiError> {
        self.transport
            .post(
                &self.path("test-cases/batch"),
                &json!({ "test_cases": drafts, "clear_existing": clear_existing }),
            )
            .await
    }

    pub async fn update_test_case(
        &self,
        case_id: i64,
        draft: &TestCaseDraft,
    ) -> Result<Value, ApiError> {
        self.transport
            .put(&self.path(&format!("test-cases/{}", case_id)), draft)
            .await
    }

    pub async fn delete_test_case(&self, case_id: i64) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&self.path(&format!("test-cases/{}", case_id)))
            .await
    }
}
