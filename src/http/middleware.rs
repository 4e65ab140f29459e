//! Request/response middleware chain.
//!
//! Middleware run in registration order. `on_request` may rewrite the outgoing
//! request or reject it before dispatch; `on_response` sees every outcome
//! (success or normalized error) and may transform it.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use tracing::{debug, warn};

use super::error::{ApiError, ApiErrorKind};
use super::{ApiRequest, ApiResponse};
use crate::session::Session;

#[async_trait]
pub trait Middleware: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn on_request(&self, _request: &mut ApiRequest) -> Result<(), ApiError> {
        Ok(())
    }

    async fn on_response(
        &self,
        _request: &ApiRequest,
        outcome: Result<ApiResponse, ApiError>,
    ) -> Result<ApiResponse, ApiError> {
        outcome
    }
}

/// Attaches `Authorization: Bearer <token>` when the session holds a credential.
pub struct BearerAuth {
    session: Session,
}

impl BearerAuth {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Middleware for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    async fn on_request(&self, request: &mut ApiRequest) -> Result<(), ApiError> {
        let Some(token) = self.session.credential() else {
            return Ok(());
        };
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
            warn!(error = %e, "Session credential is not a valid header value");
            ApiError::config()
        })?;
        request.headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// Clears the session credential when the server reports an expired session.
///
/// This is the only middleware that mutates shared state.
pub struct SessionExpiry {
    session: Session,
}

impl SessionExpiry {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Middleware for SessionExpiry {
    fn name(&self) -> &'static str {
        "session_expiry"
    }

    async fn on_response(
        &self,
        request: &ApiRequest,
        outcome: Result<ApiResponse, ApiError>,
    ) -> Result<ApiResponse, ApiError> {
        if let Err(ref err) = outcome {
            if err.kind == ApiErrorKind::SessionExpired {
                warn!(path = %request.path, "Session expired; clearing credential");
                self.session.clear_credential();
            }
        }
        outcome
    }
}

/// Emits a debug event per request and a warning per failure.
pub struct RequestLogging;

#[async_trait]
impl Middleware for RequestLogging {
    fn name(&self) -> &'static str {
        "request_logging"
    }

    async fn on_request(&self, request: &mut ApiRequest) -> Result<(), ApiError> {
        debug!(
            method = %request.method,
            path = %request.path,
            timeout_ms = request.timeout.map(|t| t.as_millis() as u64),
            "Sending API request"
        );
        Ok(())
    }

    async fn on_response(
        &self,
        request: &ApiRequest,
        outcome: Result<ApiResponse, ApiError>,
    ) -> Result<ApiResponse, ApiError> {
        match &outcome {
            Ok(response) => debug!(
                method = %request.method,
                path = %request.path,
                status = response.status,
                "API request succeeded"
            ),
            Err(err) => warn!(
                method = %request.method,
                path = %request.path,
                kind = %err.kind,
                status = ?err.status_code,
                message = %err.message,
                "API request failed"
            ),
        }
        outcome
    }
}
