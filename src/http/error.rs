//! Normalized API errors.
//!
//! Every transport failure is reduced to one `ApiError` carrying a single
//! display-ready message. Classification is a pure function of the HTTP status,
//! the request path and the response body.

use serde_json::Value;

pub const MSG_INVALID_CREDENTIALS: &str = "invalid credentials";
pub const MSG_SESSION_EXPIRED: &str = "session expired, please log in again";
pub const MSG_PERMISSION: &str = "insufficient permission";
pub const MSG_NOT_FOUND: &str = "resource not found";
pub const MSG_VALIDATION: &str = "parameter error";
pub const MSG_SERVER: &str = "internal server error";
pub const MSG_NETWORK: &str = "network unreachable, please check your network settings";
pub const MSG_CONFIG: &str = "request configuration error";
pub const MSG_DECODE: &str = "unexpected response format";

/// Path fragment identifying the login endpoint.
pub const LOGIN_PATH: &str = "/auth/login";

/// Error from a TestFlow API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The kind of error
    pub kind: ApiErrorKind,
    /// HTTP status code, if a response was received
    pub status_code: Option<u16>,
    /// Display-ready message
    pub message: String,
    /// Individual messages of a 422 validation response
    pub field_errors: Vec<String>,
}

impl ApiError {
    fn with_status(kind: ApiErrorKind, status_code: u16, message: String) -> Self {
        Self {
            kind,
            status_code: Some(status_code),
            message,
            field_errors: Vec::new(),
        }
    }

    /// Create a network error (no response received).
    pub fn network() -> Self {
        Self {
            kind: ApiErrorKind::Network,
            status_code: None,
            message: MSG_NETWORK.to_string(),
            field_errors: Vec::new(),
        }
    }

    /// Create a configuration error (request never dispatched).
    pub fn config() -> Self {
        Self {
            kind: ApiErrorKind::Config,
            status_code: None,
            message: MSG_CONFIG.to_string(),
            field_errors: Vec::new(),
        }
    }

    /// Create a decode error for a success response whose body has the wrong shape.
    pub fn decode(status_code: u16) -> Self {
        Self::with_status(ApiErrorKind::Decode, status_code, MSG_DECODE.to_string())
    }

    /// Check if this error is transient and a later attempt may succeed.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

/// Classification of API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 422 - request body or parameters rejected
    Validation,
    /// 401 from the login endpoint
    InvalidCredentials,
    /// 401 from any other endpoint; the session has been invalidated
    SessionExpired,
    /// 403
    Permission,
    /// 404
    NotFound,
    /// 5xx
    Server,
    /// Any other non-success status
    Http,
    /// No response received (connection failed, timeout)
    Network,
    /// Request could not be built or dispatched
    Config,
    /// Success status but the body did not match the expected shape
    Decode,
}

impl ApiErrorKind {
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiErrorKind::Network | ApiErrorKind::Server)
    }
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiErrorKind::Validation => write!(f, "Validation error"),
            ApiErrorKind::InvalidCredentials => write!(f, "Invalid credentials"),
            ApiErrorKind::SessionExpired => write!(f, "Session expired"),
            ApiErrorKind::Permission => write!(f, "Permission denied"),
            ApiErrorKind::NotFound => write!(f, "Not found"),
            ApiErrorKind::Server => write!(f, "Server error"),
            ApiErrorKind::Http => write!(f, "HTTP error"),
            ApiErrorKind::Network => write!(f, "Network error"),
            ApiErrorKind::Config => write!(f, "Configuration error"),
            ApiErrorKind::Decode => write!(f, "Decode error"),
        }
    }
}

/// Detail message supplied by the server, if any.
///
/// Prefers a string `detail`, then a string `message`.
fn server_detail(body: &Value) -> Option<String> {
    ["detail", "message"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Field messages of a validation error list (`detail: [{msg: ...}, ...]`).
fn validation_messages(body: &Value) -> Option<Vec<String>> {
    let messages: Vec<String> = body
        .get("detail")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("msg").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    (!messages.is_empty()).then_some(messages)
}

/// Convert a non-success HTTP response into an `ApiError`.
///
/// `path` is the request path; a 401 on the login endpoint is a credential
/// failure while a 401 anywhere else means the session has expired.
pub fn normalize_error(status: u16, path: &str, body: &Value) -> ApiError {
    let detail = server_detail(body);

    match status {
        401 if path.contains(LOGIN_PATH) => ApiError::with_status(
            ApiErrorKind::InvalidCredentials,
            status,
            detail.unwrap_or_else(|| MSG_INVALID_CREDENTIALS.to_string()),
        ),
        401 => ApiError::with_status(
            ApiErrorKind::SessionExpired,
            status,
            MSG_SESSION_EXPIRED.to_string(),
        ),
        403 => ApiError::with_status(
            ApiErrorKind::Permission,
            status,
            detail.unwrap_or_else(|| MSG_PERMISSION.to_string()),
        ),
        404 => ApiError::with_status(
            ApiErrorKind::NotFound,
            status,
            detail.unwrap_or_else(|| MSG_NOT_FOUND.to_string()),
        ),
        422 => match validation_messages(body) {
            Some(fields) => {
                let mut error = ApiError::with_status(
                    ApiErrorKind::Validation,
                    status,
                    format!("{}: {}", MSG_VALIDATION, fields.join(", ")),
                );
                error.field_errors = fields;
                error
            }
            None => ApiError::with_status(
                ApiErrorKind::Validation,
                status,
                detail.unwrap_or_else(|| MSG_VALIDATION.to_string()),
            ),
        },
        500 => ApiError::with_status(
            ApiErrorKind::Server,
            status,
            detail.unwrap_or_else(|| MSG_SERVER.to_string()),
        ),
        _ => {
            let kind = if (500..600).contains(&status) {
                ApiErrorKind::Server
            } else {
                ApiErrorKind::Http
            };
            ApiError::with_status(
                kind,
                status,
                detail.unwrap_or_else(|| format!("request failed ({})", status)),
            )
        }
    }
}
