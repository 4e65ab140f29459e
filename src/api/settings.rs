//! System settings: test categories, design methods and task concurrency.

use super::types::{
    ConcurrencyConfig, MessageResponse, SettingEntry, SettingEntryCreate, SettingEntryUpdate,
};
use crate::http::{ApiError, RequestOptions, Transport};

/// The two catalogs share one entry shape and one set of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    TestCategories,
    DesignMethods,
}

impl Catalog {
    fn base_path(self) -> &'static str {
        match self {
            Catalog::TestCategories => "/api/settings/test-categories",
            Catalog::DesignMethods => "/api/settings/design-methods",
        }
    }
}

pub struct SettingsApi<'a> {
    transport: &'a Transport,
}

impl<'a> SettingsApi<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    pub async fn list(
        &self,
        catalog: Catalog,
        active_only: bool,
    ) -> Result<Vec<SettingEntry>, ApiError> {
        self.transport
            .get_with(
                catalog.base_path(),
                RequestOptions::new().query("active_only", active_only),
            )
            .await
    }

    pub async fn create(
        &self,
        catalog: Catalog,
        entry: &SettingEntryCreate,
    ) -> Result<SettingEntry, ApiError> {
        self.transport.post(catalog.base_path(), entry).await
    }

    pub async fn update(
        &self,
        catalog: Catalog,
        id: i64,
        update: &SettingEntryUpdate,
    ) -> Result<SettingEntry, ApiError> {
        self.transport
            .put(&format!("{}/{}", catalog.base_path(), id), update)
            .await
    }

    /// Soft delete; the entry stays on the server as inactive.
    pub async fn delete(&self, catalog: Catalog, id: i64) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&format!("{}/{}", catalog.base_path(), id))
            .await
    }

    /// Restore the server's built-in defaults.
    pub async fn reset(&self, catalog: Catalog) -> Result<Vec<SettingEntry>, ApiError> {
        self.transport
            .post_empty(
                &format!("{}/reset", catalog.base_path()),
                RequestOptions::default(),
            )
            .await
    }

    pub async fn concurrency(&self) -> Result<ConcurrencyConfig, ApiError> {
        self.transport.get("/api/settings/concurrency").await
    }

    pub async fn update_concurrency(
        &self,
        config: &ConcurrencyConfig,
    ) -> Result<ConcurrencyConfig, ApiError> {
        self.transport.put("/api/settings/concurrency", config).await
    }
}
