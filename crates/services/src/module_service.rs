use std::sync::Arc;

use tracing::{info, instrument};

use academy_core::model::{
    Module, ModuleDraft, ModuleId, ModulePatch, ModuleStats, ModuleSummary,
};
use api::{ApiError, ModuleApi};

use crate::auth::AuthService;
use crate::error::ModuleServiceError;

/// Offset used when the caller does not page.
pub const DEFAULT_SKIP: u32 = 0;
/// Page size used when the caller does not page.
pub const DEFAULT_LIMIT: u32 = 10;

/// Learning module browsing and authoring.
#[derive(Clone)]
pub struct ModuleService {
    modules: Arc<dyn ModuleApi>,
    auth: AuthService,
}

impl ModuleService {
    #[must_use]
    pub fn new(modules: Arc<dyn ModuleApi>, auth: AuthService) -> Self {
        Self { modules, auth }
    }

    /// List one page of modules.
    ///
    /// # Errors
    ///
    /// Returns `ModuleServiceError::Api` if the backend call fails.
    pub async fn list(
        &self,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<ModuleSummary>, ModuleServiceError> {
        let skip = skip.unwrap_or(DEFAULT_SKIP);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        let modules = self
            .modules
            .list_modules(skip, limit)
            .await
            .map_err(|e| self.absorb(e))?;
        Ok(modules)
    }

    /// Fetch one module with its content.
    ///
    /// # Errors
    ///
    /// Returns `ModuleServiceError::Api` (`ApiError::NotFound` for unknown ids).
    pub async fn get(&self, id: ModuleId) -> Result<Module, ModuleServiceError> {
        let module = self
            .modules
            .get_module(id)
            .await
            .map_err(|e| self.absorb(e))?;
        Ok(module)
    }

    /// # Errors
    ///
    /// Returns `ModuleServiceError::NotAuthor` for students,
    /// `ModuleServiceError::Module` for blank fields, or `ModuleServiceError::Api`.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: ModuleDraft) -> Result<Module, ModuleServiceError> {
        self.ensure_author()?;
        let draft = draft.validate()?;
        let module = self
            .modules
            .create_module(&draft)
            .await
            .map_err(|e| self.absorb(e))?;
        info!(module_id = %module.id, "module created");
        Ok(module)
    }

    /// # Errors
    ///
    /// Returns `ModuleServiceError::NotAuthor` for students,
    /// `ModuleServiceError::Module` for blank fields, or `ModuleServiceError::Api`.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: ModuleId,
        patch: ModulePatch,
    ) -> Result<Module, ModuleServiceError> {
        self.ensure_author()?;
        let patch = patch.validate()?;
        let module = self
            .modules
            .update_module(id, &patch)
            .await
            .map_err(|e| self.absorb(e))?;
        info!(module_id = %module.id, "module updated");
        Ok(module)
    }

    /// # Errors
    ///
    /// Returns `ModuleServiceError::NotAuthor` for students or `ModuleServiceError::Api`.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ModuleId) -> Result<(), ModuleServiceError> {
        self.ensure_author()?;
        self.modules
            .delete_module(id)
            .await
            .map_err(|e| self.absorb(e))?;
        info!(module_id = %id, "module deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ModuleServiceError::Api` if the backend call fails.
    pub async fn stats(&self) -> Result<ModuleStats, ModuleServiceError> {
        let stats = self
            .modules
            .module_stats()
            .await
            .map_err(|e| self.absorb(e))?;
        Ok(stats)
    }

    fn ensure_author(&self) -> Result<(), ModuleServiceError> {
        match self.auth.current_user() {
            Some(user) if user.role.can_author() => Ok(()),
            _ => Err(ModuleServiceError::NotAuthor),
        }
    }

    fn absorb(&self, err: ApiError) -> ModuleServiceError {
        if err.is_unauthorized() {
            // A poisoned auth lock leaves the state as-is; the error still surfaces.
            let _ = self.auth.absorb(err.clone());
        }
        ModuleServiceError::Api(err)
    }
}
