//! Project modules and their assignees.

use super::types::{
    Module, ModuleAssignee, ModuleAssignmentRequest, ModuleListResponse, ModuleOrder,
    ModulePriority, ModuleRequest, SuccessResponse,
};
use crate::http::{ApiError, RequestOptions, Transport};
use serde_json::{json, Value};

pub struct ModulesApi<'a> {
    transport: &'a Transport,
    project_id: i64,
}

impl<'a> ModulesApi<'a> {
    pub(crate) fn new(transport: &'a Transport, project_id: i64) -> Self {
        Self {
            transport,
            project_id,
        }
    }

    fn path(&self, suffix: &str) -> String {
        format!("/api/projects/{}/modules{}", self.project_id, suffix)
    }

    pub async fn list(
        &self,
        priority: Option<ModulePriority>,
    ) -> Result<ModuleListResponse, ApiError> {
        let options = RequestOptions::new().query_opt("priority", priority.map(|p| p.as_str()));
        self.transport.get_with(&self.path(""), options).await
    }

    pub async fn get(&self, module_id: i64) -> Result<Module, ApiError> {
        self.transport
            .get(&self.path(&format!("/{}", module_id)))
            .await
    }

    pub async fn create(&self, request: &ModuleRequest) -> Result<Module, ApiError> {
        self.transport.post(&self.path(""), request).await
    }

    pub async fn update(&self, module_id: i64, request: &ModuleRequest) -> Result<Module, ApiError> {
        self.transport
            .put(&self.path(&format!("/{}", module_id)), request)
            .await
    }

    pub async fn delete(&self, module_id: i64) -> Result<Value, ApiError> {
        self.transport
            .delete(&self.path(&format!("/{}", module_id)))
            .await
    }

    pub async fn reorder(&self, orders: &[ModuleOrder]) -> Result<SuccessResponse, ApiError> {
        self.transport
            .put(&self.path("/reorder"), &json!({ "module_orders": orders }))
            .await
    }

    pub async fn assign(
        &self,
        module_id: i64,
        request: &ModuleAssignmentRequest,
    ) -> Result<ModuleAssignee, ApiError> {
        self.transport
            .post(&self.path(&format!("/{}/assign", module_id)), request)
            .await
    }

    pub async fn remove_assignment(&self, module_id: i64, user_id: i64) -> Result<Value, ApiError> {
        self.transport
            .delete(&self.path(&format!("/{}/assign/{}", module_id, user_id)))
            .await
    }

    pub async fn assignees(&self, module_id: i64) -> Result<Vec<ModuleAssignee>, ApiError> {
        self.transport
            .get(&self.path(&format!("/{}/assignees", module_id)))
            .await
    }
}
