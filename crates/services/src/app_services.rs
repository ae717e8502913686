use std::sync::Arc;

use api::{ApiConfig, Backend, CredentialStore, HttpApi, InMemoryBackend};

use crate::auth::AuthService;
use crate::catalog::CatalogService;
use crate::error::AppServicesError;
use crate::module_service::ModuleService;
use crate::quiz::QuizSessionService;
use crate::quiz_authoring::QuizAuthoringService;
use crate::Clock;

/// Assembles the app-facing services around one backend.
#[derive(Clone)]
pub struct AppServices {
    auth: Arc<AuthService>,
    modules: Arc<ModuleService>,
    quiz_sessions: Arc<QuizSessionService>,
    quiz_authoring: Arc<QuizAuthoringService>,
    catalog: Arc<CatalogService>,
}

impl AppServices {
    /// Build services that talk to the HTTP backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Api` if the HTTP client cannot be built.
    pub fn new_http(
        config: ApiConfig,
        credentials: Arc<dyn CredentialStore>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let backend = HttpApi::new(config, Arc::clone(&credentials))?;
        Ok(Self::from_backend(Arc::new(backend), credentials, clock))
    }

    /// Build services over an in-process backend, sharing its credential store.
    #[must_use]
    pub fn in_memory(backend: InMemoryBackend, clock: Clock) -> Self {
        let credentials = backend.credentials();
        Self::from_backend(Arc::new(backend), credentials, clock)
    }

    #[must_use]
    pub fn from_backend<B: Backend + 'static>(
        backend: Arc<B>,
        credentials: Arc<dyn CredentialStore>,
        clock: Clock,
    ) -> Self {
        let auth = AuthService::new(backend.clone(), credentials);
        let modules = ModuleService::new(backend.clone(), auth.clone());
        let quiz_sessions = QuizSessionService::new(clock, backend.clone());
        let quiz_authoring = QuizAuthoringService::new(backend.clone(), auth.clone());
        let catalog = CatalogService::new(backend);

        Self {
            auth: Arc::new(auth),
            modules: Arc::new(modules),
            quiz_sessions: Arc::new(quiz_sessions),
            quiz_authoring: Arc::new(quiz_authoring),
            catalog: Arc::new(catalog),
        }
    }

    /// Build services and restore any persisted session.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the client or credential store fails.
    pub async fn bootstrap(
        config: ApiConfig,
        credentials: Arc<dyn CredentialStore>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let services = Self::new_http(config, credentials, clock)?;
        services.auth.init().await?;
        Ok(services)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn modules(&self) -> Arc<ModuleService> {
        Arc::clone(&self.modules)
    }

    #[must_use]
    pub fn quiz_sessions(&self) -> Arc<QuizSessionService> {
        Arc::clone(&self.quiz_sessions)
    }

    #[must_use]
    pub fn quiz_authoring(&self) -> Arc<QuizAuthoringService> {
        Arc::clone(&self.quiz_authoring)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }
}
