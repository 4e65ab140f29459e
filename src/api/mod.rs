//! Typed client for the TestFlow REST API.
//!
//! `TestFlowClient` owns one `Transport` and one `Session`; every resource
//! view borrows them, so a login through `auth()` is immediately visible to
//! `projects()`, `tasks()` and the rest.
//!
//! ## Resources
//!
//! - `auth()` - login, logout, token refresh, current user, user admin
//! - `projects()` - projects, members, stats, project-wide test cases, admin views
//! - `modules(project)` - modules, ordering, assignees
//! - `requirements(project, module)` - requirement files, requirement points,
//!   test points, test cases
//! - `test_data()` - the cross-module test hierarchy, edits by id, totals
//! - `settings()` - test categories, design methods, concurrency
//! - `system()` - health, version info, admin totals
//! - `ai_models()` - model endpoints and agent configuration
//! - `agents()` - synchronous agent runs and lookups
//! - `tasks()` - async task submit / status / cancel

mod agents;
mod ai_models;
mod auth;
mod modules;
mod projects;
mod requirements;
mod settings;
mod system;
mod test_data;
pub mod types;

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::http::{ApiError, Transport};
use crate::session::Session;
use crate::task::{AsyncTaskClient, Poller, PollerConfig, TaskError, TaskType};

pub use agents::AgentsApi;
pub use ai_models::AiModelsApi;
pub use auth::AuthApi;
pub use modules::ModulesApi;
pub use projects::ProjectsApi;
pub use requirements::RequirementsApi;
pub use settings::{Catalog, SettingsApi};
pub use system::SystemApi;
pub use test_data::TestDataApi;
pub use types::*;

#[derive(Debug, Clone)]
pub struct TestFlowClient {
    config: ClientConfig,
    transport: Transport,
}

impl TestFlowClient {
    /// Build a client with a fresh session, seeded from `config.token` if set.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let session = match config.token.as_deref() {
            Some(token) => Session::with_credential(token),
            None => Session::new(),
        };
        Self::with_session(config, session)
    }

    /// Build a client that shares an existing session.
    pub fn with_session(config: ClientConfig, session: Session) -> Result<Self, ApiError> {
        let transport = Transport::new(&config, session)?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        self.transport.session()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.transport)
    }

    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(&self.transport)
    }

    pub fn modules(&self, project_id: i64) -> ModulesApi<'_> {
        ModulesApi::new(&self.transport, project_id)
    }

    pub fn requirements(&self, project_id: i64, module_id: i64) -> RequirementsApi<'_> {
        RequirementsApi::new(&self.transport, project_id, module_id)
    }

    pub fn test_data(&self) -> TestDataApi<'_> {
        TestDataApi::new(&self.transport)
    }

    pub fn settings(&self) -> SettingsApi<'_> {
        SettingsApi::new(&self.transport)
    }

    pub fn system(&self) -> SystemApi<'_> {
        SystemApi::new(&self.transport)
    }

    pub fn ai_models(&self) -> AiModelsApi<'_> {
        AiModelsApi::new(&self.transport)
    }

    pub fn agents(&self) -> AgentsApi<'_> {
        AgentsApi::new(&self.transport)
    }

    pub fn tasks(&self) -> AsyncTaskClient {
        AsyncTaskClient::new(self.transport.clone())
    }

    /// A poller using the configured interval and attempt limit.
    pub fn poller(&self) -> Poller {
        Poller::new(PollerConfig::from_client_config(&self.config))
    }

    /// Submit a task and wait for its result with the default poller.
    pub async fn run_task<P: Serialize + ?Sized>(
        &self,
        task_type: &TaskType,
        payload: &P,
        cancel: &CancellationToken,
    ) -> Result<Value, TaskError> {
        let tasks = self.tasks();
        let accepted = tasks.submit(task_type, payload).await?;
        self.poller()
            .wait_for_result(&tasks, &accepted.task_id, cancel)
            .await
    }
}
