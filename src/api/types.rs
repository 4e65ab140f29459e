//! API request and response types.
//!
//! Fields the server may omit are `Option` or `#[serde(default)]`; payloads
//! whose shape varies by endpoint version stay `serde_json::Value`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::RequestOptions;
use crate::task::task::lenient_timestamp;

/// Plain `{"message": ...}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Auth and users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordUpdateRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UserListParams {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

impl UserListParams {
    pub(crate) fn to_options(&self) -> RequestOptions {
        RequestOptions::new()
            .query_opt("skip", self.skip)
            .query_opt("limit", self.limit)
            .query_opt(
                "role",
                self.role.map(|r| match r {
                    UserRole::Admin => "admin",
                    UserRole::User => "user",
                }),
            )
            .query_opt("is_active", self.is_active)
            .query_opt("search", self.search.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner_id: i64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Member,
    Viewer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMember {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub role: MemberRole,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    #[serde(default)]
    pub owner: Option<User>,
    #[serde(default)]
    pub members: Vec<ProjectMember>,
    #[serde(default)]
    pub member_count: u64,
    #[serde(default)]
    pub requirement_files_count: u64,
    #[serde(default)]
    pub requirement_points_count: u64,
    #[serde(default)]
    pub test_cases_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectListParams {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub owner_id: Option<i64>,
}

impl ProjectListParams {
    pub(crate) fn to_options(&self) -> RequestOptions {
        RequestOptions::new()
            .query_opt("skip", self.skip)
            .query_opt("limit", self.limit)
            .query_opt("search", self.search.as_deref())
            .query_opt("owner_id", self.owner_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMemberRequest {
    pub user_id: i64,
    pub role: MemberRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStats {
    #[serde(default)]
    pub module_count: u64,
    #[serde(default)]
    pub member_count: u64,
    #[serde(default)]
    pub requirement_points_count: u64,
    #[serde(default)]
    pub test_cases_count: u64,
    #[serde(default)]
    pub modules_by_status: Value,
    #[serde(default)]
    pub modules_by_priority: Value,
    #[serde(default)]
    pub recent_activities: Vec<Value>,
}

/// Filters for the flattened project test case listing.
#[derive(Debug, Clone, Default)]
pub struct ProjectTestCaseFilter {
    /// `hierarchy` or `flat`
    pub view_mode: Option<String>,
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl ProjectTestCaseFilter {
    pub(crate) fn to_options(&self) -> RequestOptions {
        RequestOptions::new()
            .query_opt("view_mode", self.view_mode.as_deref())
            .query_opt("keyword", self.keyword.as_deref())
            .query_opt("status", self.status.as_deref())
            .query_opt("priority", self.priority.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteResponse {
    pub deleted_count: u64,
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Planning,
    InProgress,
    Completed,
    OnHold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModulePriority {
    Low,
    Medium,
    High,
    Critical,
}

impl ModulePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModulePriority::Low => "low",
            ModulePriority::Medium => "medium",
            ModulePriority::High => "high",
            ModulePriority::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleStats {
    #[serde(default)]
    pub requirement_files_count: u64,
    #[serde(default)]
    pub requirement_points_count: u64,
    #[serde(default)]
    pub test_points_count: u64,
    #[serde(default)]
    pub test_cases_count: u64,
    #[serde(default)]
    pub test_cases_approved: u64,
    #[serde(default)]
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleAssignee {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_by: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: ModulePriority,
    pub status: ModuleStatus,
    #[serde(default)]
    pub order_num: i64,
    #[serde(default)]
    pub stats: ModuleStats,
    #[serde(default)]
    pub assignees: Vec<ModuleAssignee>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleListResponse {
    pub modules: Vec<Module>,
    pub total: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<ModulePriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ModuleStatus>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModuleOrder {
    pub id: i64,
    pub order_num: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleAssignmentRequest {
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Requirement points, test points, test cases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementPoint {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_by_ai: bool,
    #[serde(default)]
    pub edited_by_user: bool,
}

/// Content edit for a requirement point; sent as query parameters.
#[derive(Debug, Clone)]
pub struct RequirementPointEdit {
    pub content: String,
    pub priority: Option<String>,
}

impl RequirementPointEdit {
    pub(crate) fn to_options(&self) -> RequestOptions {
        RequestOptions::new()
            .query("content", &self.content)
            .query_opt("priority", self.priority.as_deref())
    }
}

/// Content edit for a test point; sent as query parameters.
#[derive(Debug, Clone)]
pub struct TestPointEdit {
    pub content: String,
    /// Required on create, ignored on update
    pub requirement_point_id: Option<i64>,
    pub test_type: Option<String>,
    pub priority: Option<String>,
}

impl TestPointEdit {
    pub(crate) fn to_options(&self) -> RequestOptions {
        RequestOptions::new()
            .query("content", &self.content)
            .query_opt("requirement_point_id", self.requirement_point_id)
            .query_opt("test_type", self.test_type.as_deref())
            .query_opt("priority", self.priority.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestPointDraft {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement_point_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_ai: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    pub step: u32,
    pub action: String,
    pub expected: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCaseDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_point_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preconditions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_steps: Option<Vec<TestStep>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_ai: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCreateResponse {
    pub success: bool,
    pub created_count: u64,
    #[serde(default)]
    pub deleted_count: Option<u64>,
    #[serde(default, alias = "points", alias = "test_cases")]
    pub items: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Requirement files
// ---------------------------------------------------------------------------

/// Metadata of an uploaded requirement document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementFile {
    pub id: i64,
    pub project_id: i64,
    #[serde(default)]
    pub module_id: Option<i64>,
    pub filename: String,
    pub file_type: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub uploaded_by: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub upload_time: Option<DateTime<Utc>>,
    /// Text extraction finished without error
    #[serde(default)]
    pub is_extracted: bool,
    #[serde(default)]
    pub extract_error: Option<String>,
    #[serde(default)]
    pub has_images: bool,
    #[serde(default)]
    pub image_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementImage {
    pub id: i64,
    pub requirement_file_id: i64,
    pub image_path: String,
    #[serde(default)]
    pub image_format: String,
    #[serde(default)]
    pub image_size: u64,
    #[serde(default)]
    pub position_index: u32,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub alt_text: Option<String>,
}

/// Extracted text of a requirement file with its points and images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementFileContent {
    pub id: i64,
    pub filename: String,
    pub file_type: String,
    #[serde(default)]
    pub extracted_content: Option<String>,
    #[serde(default)]
    pub is_extracted: bool,
    #[serde(default)]
    pub extract_error: Option<String>,
    #[serde(default)]
    pub has_images: bool,
    #[serde(default)]
    pub image_count: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub requirement_points: Vec<RequirementPoint>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<RequirementImage>,
}

// ---------------------------------------------------------------------------
// Test data hierarchy
// ---------------------------------------------------------------------------

/// Restricts a hierarchy query to one requirement file or module.
#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchyFilter {
    pub file_id: Option<i64>,
    pub module_id: Option<i64>,
}

impl HierarchyFilter {
    pub(crate) fn to_options(self) -> RequestOptions {
        RequestOptions::new()
            .query_opt("file_id", self.file_id)
            .query_opt("module_id", self.module_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyTestCase {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub test_method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyTestPoint {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub test_type: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub test_cases: Vec<HierarchyTestCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyRequirementPoint {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub order_index: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub test_points: Vec<HierarchyTestPoint>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyStatistics {
    pub total_requirement_points: u64,
    pub total_test_points: u64,
    pub total_test_cases: u64,
}

/// Requirement points, their test points and those points' test cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestHierarchy {
    pub project_id: i64,
    #[serde(default)]
    pub file_id: Option<i64>,
    pub requirement_points: Vec<HierarchyRequirementPoint>,
    pub statistics: HierarchyStatistics,
}

/// Acknowledgement of a test data edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDataEdit {
    pub id: i64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Totals across every project visible to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDataStats {
    pub total_test_cases: u64,
    pub total_test_points: u64,
    pub total_requirement_points: u64,
    /// Test cases created in the last seven days
    #[serde(default)]
    pub weekly_new: u64,
    /// Active agents
    #[serde(default)]
    pub total_agents: u64,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// A test category or test design method entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingEntry {
    pub id: i64,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub order_index: i64,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingEntryCreate {
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
    pub order_index: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingEntryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
}

/// Server-side worker pool settings for async tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    /// 1..=10
    pub max_concurrent_tasks: u32,
    /// Seconds, 30..=600
    pub task_timeout: u32,
    /// 0..=5
    pub retry_count: u32,
    /// 10..=1000
    pub queue_size: u32,
}

// ---------------------------------------------------------------------------
// AI models and agent configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiModel {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub provider: String,
    pub model_id: String,
    pub base_url: String,
    #[serde(default)]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub stream_support: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Only present on the detail endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiModelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_support: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiModelTestResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub agent_type: String,
    #[serde(default)]
    pub type_display: String,
    #[serde(default)]
    pub ai_model_name: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub max_tokens: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfigRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Only accepted on create
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_model_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Page {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl Page {
    pub(crate) fn to_options(self) -> RequestOptions {
        RequestOptions::new()
            .query_opt("skip", self.skip)
            .query_opt("limit", self.limit)
    }
}

// ---------------------------------------------------------------------------
// Synchronous agent runs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementAnalysisRequest {
    pub requirement_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,
    /// Image paths for multimodal analysis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_paths: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCaseOptimizationRequest {
    pub original_test_cases: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_feedback: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization_requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,
}

/// Result of a synchronous agent run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRunResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    /// Server-side log entry id
    #[serde(default)]
    pub task_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentListResponse {
    pub agents: Vec<Value>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskLogResponse {
    pub logs: Vec<Value>,
    #[serde(default)]
    pub total: u64,
}

/// `{value, label}` option as returned by the agent lookup endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledOption {
    pub value: String,
    pub label: String,
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    /// `healthy` or `unhealthy`
    pub status: String,
    /// `healthy`, or the database error text
    pub database: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub app_name: String,
}

impl SystemHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub app_name: String,
    pub version: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub database_type: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Upload limit in bytes
    #[serde(default)]
    pub max_file_size: u64,
    #[serde(default)]
    pub allowed_file_types: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCounts {
    pub total: u64,
    #[serde(default)]
    pub active: u64,
    #[serde(default)]
    pub inactive: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCounts {
    pub total: u64,
    #[serde(default)]
    pub admin: u64,
    #[serde(default)]
    pub active: u64,
    #[serde(default)]
    pub inactive: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCounts {
    pub total: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfigCounts {
    pub models: ActiveCounts,
    pub agents: ActiveCounts,
}

/// Admin-only system totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStats {
    pub users: UserCounts,
    pub projects: ProjectCounts,
    pub ai_config: AiConfigCounts,
}

fn default_true() -> bool {
    true
}

/// Treat an explicit `null` list as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
