//! Cross-module test data: the requirement → test point → test case tree and
//! edits addressed by item id alone.
//!
//! Requirement point and test point edits travel as query parameters; test
//! case edits are a JSON body.

use super::types::{
    HierarchyFilter, MessageResponse, TestCaseDraft, TestDataEdit, TestDataStats, TestHierarchy,
};
use crate::http::{ApiError, RequestOptions, Transport};

pub struct TestDataApi<'a> {
    transport: &'a Transport,
}

impl<'a> TestDataApi<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    pub async fn hierarchy(
        &self,
        project_id: i64,
        filter: HierarchyFilter,
    ) -> Result<TestHierarchy, ApiError> {
        self.transport
            .get_with(
                &format!("/api/test-data/projects/{}/test-hierarchy", project_id),
                filter.to_options(),
            )
            .await
    }

    /// Replace a requirement point's text; the server marks it confirmed.
    pub async fn update_requirement_point(
        &self,
        point_id: i64,
        content: &str,
    ) -> Result<TestDataEdit, ApiError> {
        self.transport
            .put_query(
                &format!("/api/test-data/requirement-points/{}", point_id),
                RequestOptions::new().query("content", content),
            )
            .await
    }

    pub async fn update_test_point(
        &self,
        point_id: i64,
        content: &str,
        test_type: Option<&str>,
        priority: Option<&str>,
    ) -> Result<TestDataEdit, ApiError> {
        let options = RequestOptions::new()
            .query("content", content)
            .query_opt("test_type", test_type)
            .query_opt("priority", priority);
        self.transport
            .put_query(&format!("/api/test-data/test-points/{}", point_id), options)
            .await
    }

    pub async fn update_test_case(
        &self,
        case_id: i64,
        update: &TestCaseDraft,
    ) -> Result<TestDataEdit, ApiError> {
        self.transport
            .put(&format!("/api/test-data/test-cases/{}", case_id), update)
            .await
    }

    /// Delete a requirement point with its test points and their test cases.
    pub async fn delete_requirement_point(
        &self,
        point_id: i64,
    ) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&format!("/api/test-data/requirement-points/{}", point_id))
            .await
    }

    /// Delete a test point with its test cases.
    pub async fn delete_test_point(&self, point_id: i64) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&format!("/api/test-data/test-points/{}", point_id))
            .await
    }

    pub async fn delete_test_case(&self, case_id: i64) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&format!("/api/test-data/test-cases/{}", case_id))
            .await
    }

    pub async fn stats(&self) -> Result<TestDataStats, ApiError> {
        self.transport.get("/api/test-data/stats").await
    }
}
