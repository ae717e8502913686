use std::sync::Arc;

use tracing::warn;

use academy_core::model::{Course, Health};
use api::{ApiError, CatalogApi};

/// Public, unauthenticated backend data: the course catalog and liveness.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogApi>,
}

impl CatalogService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the backend call fails.
    pub async fn courses(&self) -> Result<Vec<Course>, ApiError> {
        self.catalog.courses().await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the backend cannot be reached.
    pub async fn health(&self) -> Result<Health, ApiError> {
        self.catalog.health().await
    }

    /// True when the backend answers its health check with "ok".
    pub async fn is_reachable(&self) -> bool {
        match self.catalog.health().await {
            Ok(health) => health.is_ok(),
            Err(err) => {
                warn!(error = %err, "backend health check failed");
                false
            }
        }
    }
}
