//! Read-only system endpoints.

use super::types::{SystemHealth, SystemInfo, SystemStats};
use crate::http::{ApiError, Transport};

pub struct SystemApi<'a> {
    transport: &'a Transport,
}

impl<'a> SystemApi<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// Service and database health. Needs no credential.
    pub async fn health(&self) -> Result<SystemHealth, ApiError> {
        self.transport.get("/api/system/health").await
    }

    /// Version and upload limits. Needs no credential.
    pub async fn info(&self) -> Result<SystemInfo, ApiError> {
        self.transport.get("/api/system/info").await
    }

    /// User, project and AI configuration totals (administrators only).
    pub async fn stats(&self) -> Result<SystemStats, ApiError> {
        self.transport.get("/api/system/stats").await
    }
}
