//! In-process mock of the TestFlow backend for tests.
//!
//! Binds `127.0.0.1:0` and serves a small axum router that mimics the real
//! server's status codes and error bodies. Async tasks advance one step per
//! status request: pending, running 1/3, running 2/3, then terminal.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

pub const VALID_TOKEN: &str = "tok-123";
pub const VALID_PASSWORD: &str = "secret";

/// Submissions with this `agent_id` end in `failed`.
pub const FAILING_AGENT_ID: i64 = 999;

/// The one requirement file (project 7, module 3) whose text has been extracted.
pub const EXTRACTED_FILE_ID: i64 = 5;

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

#[derive(Default)]
pub struct MockState {
    requests: Mutex<HashMap<String, u32>>,
    tasks: Mutex<HashMap<String, MockTask>>,
}

impl MockState {
    /// Requests that reached the server for `path`.
    pub fn request_count(&self, path: &str) -> u32 {
        self.requests
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

struct MockTask {
    script: Vec<Value>,
    cursor: usize,
    last_observed: Option<Value>,
    cancelled: bool,
}

impl MockTask {
    fn next_snapshot(&mut self) -> Value {
        let snapshot = if self.cancelled {
            let mut last = self
                .last_observed
                .clone()
                .unwrap_or_else(|| self.script[0].clone());
            last["status"] = json!("cancelled");
            last
        } else {
            let index = self.cursor.min(self.script.len() - 1);
            self.cursor += 1;
            self.script[index].clone()
        };
        self.last_observed = Some(snapshot.clone());
        snapshot
    }

    fn is_finished(&self) -> bool {
        self.cancelled
            || self
                .last_observed
                .as_ref()
                .and_then(|s| s["status"].as_str())
                .is_some_and(|s| matches!(s, "completed" | "failed" | "cancelled" | "timeout"))
    }
}

pub async fn spawn_backend() -> MockBackend {
    let state = Arc::new(MockState::default());
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    MockBackend {
        base_url: format!("http://{}", addr),
        state,
    }
}

/// A base URL on which nothing is listening.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/echo/headers", get(echo_headers))
        .route("/api/echo/query", get(echo_query))
        .route("/api/fail/:code", get(fail))
        .route("/api/slow", get(slow))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/projects", get(list_projects))
        .route("/api/projects/admin", get(list_projects_admin))
        .route("/api/projects/:project_id", get(get_project))
        .route("/api/projects/:project_id/modules", get(list_modules))
        .route(
            "/api/projects/:project_id/modules/:module_id/requirements/files",
            get(list_requirement_files),
        )
        .route(
            "/api/projects/:project_id/requirements/files/:file_id/content",
            get(requirement_file_content),
        )
        .route(
            "/api/projects/:project_id/modules/:module_id/requirements/files/:file_id/generate-all",
            post(submit_one_click_generation),
        )
        .route(
            "/api/projects/:project_id/modules/:module_id/test-points/batch",
            post(batch_test_points),
        )
        .route(
            "/api/test-data/projects/:project_id/test-hierarchy",
            get(test_hierarchy),
        )
        .route(
            "/api/test-data/requirement-points/:point_id",
            put(update_requirement_point),
        )
        .route("/api/test-data/stats", get(test_data_stats))
        .route("/api/system/health", get(system_health))
        .route("/api/system/stats", get(system_stats))
        .route("/api/settings/test-categories", get(test_categories))
        .route("/api/agents/design-methods", get(design_methods))
        .route(
            "/api/agents/test-point-generation/async",
            post(submit_test_point_generation),
        )
        .route("/api/agents/test-case-design/async", post(submit_test_case_design))
        .route(
            "/api/agents/test-case-optimization/batch",
            post(submit_test_case_optimization),
        )
        .route("/api/agents/tasks/:task_id/status", get(task_status))
        .route("/api/agents/tasks/:task_id/cancel", post(cancel_task))
        .layer(middleware::from_fn_with_state(state.clone(), count_requests))
        .with_state(state)
}

async fn count_requests(
    State(state): State<Arc<MockState>>,
    request: Request,
    next: Next,
) -> Response {
    *state
        .requests
        .lock()
        .unwrap()
        .entry(request.uri().path().to_string())
        .or_default() += 1;
    next.run(request).await
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn require_auth(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {}", VALID_TOKEN);
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(detail(
            StatusCode::UNAUTHORIZED,
            "Could not validate credentials",
        )),
    }
}

fn validation_error(message: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "detail": [{ "loc": ["body"], "msg": message, "type": "value_error" }]
        })),
    )
        .into_response()
}

fn alice() -> Value {
    json!({
        "id": 1,
        "username": "alice",
        "email": "alice@example.com",
        "role": "admin",
        "is_active": true,
        "created_at": "2024-01-05T09:00:00",
        "updated_at": "2024-01-05T09:00:00",
    })
}

// Transport fixtures

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({ "authorization": authorization }))
}

async fn echo_query(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!(params))
}

async fn fail(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap();
    match code {
        422 => (
            status,
            Json(json!({
                "detail": [
                    { "loc": ["body", "name"], "msg": "field required", "type": "missing" },
                    { "loc": ["body", "description"], "msg": "too long", "type": "value_error" },
                ]
            })),
        )
            .into_response(),
        403 => (status, Json(json!({}))).into_response(),
        404 => detail(status, "project 7 does not exist"),
        _ => status.into_response(),
    }
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(300)).await;
    Json(json!({ "slow": true }))
}

// Auth

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != VALID_PASSWORD {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect username or password");
    }
    Json(json!({
        "access_token": VALID_TOKEN,
        "refresh_token": "refresh-1",
        "token_type": "bearer",
        "user": alice(),
    }))
    .into_response()
}

async fn logout() -> Json<Value> {
    Json(json!({ "message": "Logged out" }))
}

async fn me(headers: HeaderMap) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    Json(alice()).into_response()
}

// Resources

fn projects() -> Vec<Value> {
    vec![
        json!({ "id": 7, "name": "Checkout", "description": "Cart and payment", "owner_id": 1,
                "created_at": "2024-02-01T10:00:00", "updated_at": "2024-02-03T12:30:00" }),
        json!({ "id": 8, "name": "Billing", "description": null, "owner_id": 1,
                "created_at": "2024-02-04T10:00:00", "updated_at": "2024-02-04T10:00:00" }),
    ]
}

async fn list_projects(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    let search = params.get("search").map(|s| s.to_lowercase());
    let matched: Vec<Value> = projects()
        .into_iter()
        .filter(|p| match &search {
            Some(s) => p["name"].as_str().unwrap_or("").to_lowercase().contains(s),
            None => true,
        })
        .collect();
    Json(json!({ "total": matched.len(), "skip": 0, "limit": 100, "projects": matched }))
        .into_response()
}

async fn get_project(headers: HeaderMap, Path(project_id): Path<i64>) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    match projects().into_iter().find(|p| p["id"] == project_id) {
        Some(mut project) => {
            project["owner"] = alice();
            project["members"] = json!([]);
            project["member_count"] = json!(1);
            project["test_cases_count"] = json!(12);
            Json(project).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Project not found"),
    }
}

/// Same listing without membership filtering; only admins get through.
async fn list_projects_admin(headers: HeaderMap) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    let all = projects();
    Json(json!({ "total": all.len(), "skip": 0, "limit": 20, "projects": all })).into_response()
}

async fn list_modules(
    headers: HeaderMap,
    Path(project_id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    let modules = vec![
        json!({ "id": 3, "project_id": project_id, "name": "Payment", "priority": "high",
                "status": "in_progress", "order_num": 1,
                "stats": { "test_points_count": 4, "completion_rate": 0.5 }, "assignees": [] }),
        json!({ "id": 4, "project_id": project_id, "name": "Coupons", "priority": "low",
                "status": "planning", "order_num": 2 }),
    ];
    let matched: Vec<Value> = modules
        .into_iter()
        .filter(|m| match params.get("priority") {
            Some(p) => m["priority"] == p.as_str(),
            None => true,
        })
        .collect();
    Json(json!({ "total": matched.len(), "modules": matched })).into_response()
}

async fn batch_test_points(
    headers: HeaderMap,
    Path((_project_id, _module_id)): Path<(i64, i64)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    let points = body["points"].as_array().cloned().unwrap_or_default();
    let created: Vec<Value> = points
        .iter()
        .enumerate()
        .map(|(i, p)| json!({ "id": i + 1, "content": p["content"], "created_by_ai": false }))
        .collect();
    let mut response = json!({
        "success": true,
        "created_count": created.len(),
        "points": created,
    });
    if body["clear_existing"] == true {
        response["deleted_count"] = json!(0);
    }
    Json(response).into_response()
}

fn requirement_file(file_id: i64, extracted: bool) -> Value {
    json!({
        "id": file_id, "project_id": 7, "module_id": 3,
        "filename": format!("spec-{}.docx", file_id), "file_type": "docx",
        "file_path": format!("uploads/{}.docx", file_id), "file_size": 20480,
        "uploaded_by": 1, "upload_time": "2024-03-01T09:15:00",
        "extracted_content": if extracted { json!("Users pay by card.") } else { Value::Null },
        "is_extracted": extracted, "extract_error": null,
        "has_images": false, "image_count": 0,
    })
}

async fn list_requirement_files(
    headers: HeaderMap,
    Path((_project_id, _module_id)): Path<(i64, i64)>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    Json(json!([
        requirement_file(EXTRACTED_FILE_ID + 1, false),
        requirement_file(EXTRACTED_FILE_ID, true),
    ]))
    .into_response()
}

async fn requirement_file_content(
    headers: HeaderMap,
    Path((_project_id, file_id)): Path<(i64, i64)>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    if file_id != EXTRACTED_FILE_ID {
        return detail(StatusCode::NOT_FOUND, "Requirement file not found");
    }
    Json(json!({
        "id": file_id, "filename": "spec-5.docx", "file_type": "docx",
        "extracted_content": "Users pay by card.", "is_extracted": true,
        "extract_error": null, "has_images": false, "image_count": 0,
        "requirement_points": [
            { "id": 1, "content": "Card payment", "priority": "high", "created_by_ai": true }
        ],
        "images": null,
    }))
    .into_response()
}

async fn test_hierarchy(
    headers: HeaderMap,
    Path(project_id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    if project_id != 7 {
        return detail(StatusCode::NOT_FOUND, "Project not found");
    }
    let points = if params.get("module_id").map(String::as_str) == Some("4") {
        json!([])
    } else {
        json!([{
            "id": 1, "content": "Card payment", "order_index": 1, "status": "confirmed",
            "test_points": [{
                "id": 10, "content": "expired card is declined", "test_type": "functional",
                "priority": "high", "status": "draft",
                "test_cases": [
                    { "id": 100, "title": "decline expired card", "description": null,
                      "status": "draft", "test_method": "black_box" },
                    { "id": 101, "title": "show decline reason", "description": "message text",
                      "status": "draft", "test_method": null },
                ]
            }]
        }])
    };
    let requirement_points = points.as_array().map_or(0, Vec::len);
    let test_cases = if requirement_points == 0 { 0 } else { 2 };
    Json(json!({
        "project_id": project_id,
        "file_id": params.get("file_id").and_then(|f| f.parse::<i64>().ok()),
        "requirement_points": points,
        "statistics": {
            "total_requirement_points": requirement_points,
            "total_test_points": requirement_points,
            "total_test_cases": test_cases,
        }
    }))
    .into_response()
}

/// `content` is a required query parameter, as on the real endpoint.
async fn update_requirement_point(
    headers: HeaderMap,
    Path(point_id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    match params.get("content") {
        Some(content) => {
            Json(json!({ "id": point_id, "content": content, "status": "confirmed" }))
                .into_response()
        }
        None => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "detail": [{ "loc": ["query", "content"], "msg": "field required", "type": "missing" }]
            })),
        )
            .into_response(),
    }
}

async fn test_data_stats(headers: HeaderMap) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    Json(json!({
        "total_test_cases": 42, "total_test_points": 17, "total_requirement_points": 6,
        "weekly_new": 5, "total_agents": 4,
    }))
    .into_response()
}

// System

async fn system_health() -> Json<Value> {
    Json(json!({
        "status": "healthy", "database": "healthy",
        "version": "1.0.0", "app_name": "TestFlow",
    }))
}

async fn system_stats(headers: HeaderMap) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    Json(json!({
        "users": { "total": 3, "admin": 1, "active": 2, "inactive": 1 },
        "projects": { "total": 2 },
        "ai_config": {
            "models": { "total": 2, "active": 1, "inactive": 1 },
            "agents": { "total": 5, "active": 4, "inactive": 1 },
        }
    }))
    .into_response()
}

async fn test_categories(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    let entries = vec![
        json!({ "id": 1, "name": "Functional", "code": "functional", "description": null,
                "is_active": true, "order_index": 1, "is_default": true }),
        json!({ "id": 2, "name": "Security", "code": "security", "description": "Auth and input handling",
                "is_active": false, "order_index": 2, "is_default": true }),
    ];
    let active_only = params.get("active_only").map(String::as_str) == Some("true");
    let matched: Vec<Value> = entries
        .into_iter()
        .filter(|e| !active_only || e["is_active"] == true)
        .collect();
    Json(json!(matched)).into_response()
}

async fn design_methods(headers: HeaderMap) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    Json(json!({
        "design_methods": [{ "value": "boundary_value", "label": "Boundary value analysis" }]
    }))
    .into_response()
}

// Async tasks

fn task_script(task_id: &str, task_type: &str, fails: bool) -> Vec<Value> {
    let created_at = chrono::Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string();
    let step = |status: &str, completed: u32| {
        json!({
            "task_id": task_id,
            "task_type": task_type,
            "status": status,
            "progress": completed * 100 / 3,
            "total_batches": 3,
            "completed_batches": completed,
            "result": null,
            "error": null,
            "message": null,
            "created_at": created_at,
        })
    };

    let mut script = vec![step("pending", 0), step("running", 1)];
    if fails {
        let mut failed = step("failed", 1);
        failed["error"] = json!("model quota exhausted");
        script.push(failed);
        return script;
    }
    script.push(step("running", 2));
    let mut completed = step("completed", 3);
    completed["result"] = if task_type == "test_point_generation" {
        json!({ "test_points": [{ "content": "refund to original payment method" }] })
    } else {
        json!({ "test_cases": [{ "title": "refund succeeds" }] })
    };
    script.push(completed);
    script
}

fn register_task(state: &MockState, task_type: &str, fails: bool) -> String {
    let task_id = uuid::Uuid::new_v4().to_string();
    let task = MockTask {
        script: task_script(&task_id, task_type, fails),
        cursor: 0,
        last_observed: None,
        cancelled: false,
    };
    state.tasks.lock().unwrap().insert(task_id.clone(), task);
    task_id
}

fn accept_task(state: &MockState, task_type: &str, body: &Value) -> Response {
    let fails = body["agent_id"].as_i64() == Some(FAILING_AGENT_ID);
    let task_id = register_task(state, task_type, fails);
    Json(json!({ "task_id": task_id, "status": "pending", "message": "Task submitted" }))
        .into_response()
}

fn non_empty(body: &Value, field: &str) -> bool {
    body[field].as_array().is_some_and(|a| !a.is_empty())
}

async fn submit_test_point_generation(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    if !non_empty(&body, "requirement_points") {
        return validation_error("ensure this value has at least 1 items");
    }
    accept_task(&state, "test_point_generation", &body)
}

async fn submit_test_case_design(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    if !non_empty(&body, "test_points") {
        return validation_error("ensure this value has at least 1 items");
    }
    accept_task(&state, "test_case_design", &body)
}

async fn submit_test_case_optimization(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    if !non_empty(&body, "test_cases") {
        return validation_error("ensure this value has at least 1 items");
    }
    accept_task(&state, "test_case_optimization", &body)
}

/// Replies like the real endpoint: no `status` field, an `estimated_time`.
async fn submit_one_click_generation(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path((_project_id, _module_id, file_id)): Path<(i64, i64, i64)>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    if file_id != EXTRACTED_FILE_ID {
        return detail(StatusCode::NOT_FOUND, "Requirement file not found");
    }
    let task_id = register_task(&state, "one_click_generation", false);
    Json(json!({
        "task_id": task_id,
        "message": "One-click generation started",
        "estimated_time": "3-5 minutes",
    }))
    .into_response()
}

async fn task_status(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(task_id): Path<String>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    let mut tasks = state.tasks.lock().unwrap();
    match tasks.get_mut(&task_id) {
        Some(task) => Json(task.next_snapshot()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn cancel_task(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(task_id): Path<String>,
) -> Response {
    if let Err(rejection) = require_auth(&headers) {
        return rejection;
    }
    let mut tasks = state.tasks.lock().unwrap();
    let Some(task) = tasks.get_mut(&task_id) else {
        return detail(StatusCode::NOT_FOUND, "Task not found or already removed");
    };
    // The TestFlow server cancels even finished tasks and reports success;
    // this mock refuses instead so callers can exercise the no-op outcome.
    if task.is_finished() {
        return Json(json!({ "success": false, "message": "task already finished" }))
            .into_response();
    }
    task.cancelled = true;
    Json(json!({ "success": true, "message": "Task cancelled" })).into_response()
}
