//! Submission payloads for the async agent endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generate test points from requirement points.
///
/// Test categories and design methods are loaded server-side from system
/// settings, so they are not part of the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestPointGenerationRequest {
    pub requirement_points: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,
}

/// Design test cases for a module's test points, with automatic optimization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCaseDesignRequest {
    /// Each entry carries at least `id` and `content`
    pub test_points: Vec<Value>,
    pub module_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_existing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,
}

/// Optimize a batch of existing test cases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCaseOptimizationBatchRequest {
    pub test_cases: Vec<Value>,
    pub module_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_feedback: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization_requirements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_save: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,
}
