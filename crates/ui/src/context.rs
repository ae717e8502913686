use std::sync::Arc;

use dioxus::prelude::*;

use services::{
    AppServices, AuthService, AuthState, CatalogService, ModuleService, QuizAuthoringService,
    QuizSessionService,
};

pub trait UiApp: Send + Sync {
    fn auth(&self) -> Arc<AuthService>;
    fn modules(&self) -> Arc<ModuleService>;
    fn quiz_sessions(&self) -> Arc<QuizSessionService>;
    fn quiz_authoring(&self) -> Arc<QuizAuthoringService>;
    fn catalog(&self) -> Arc<CatalogService>;
}

impl UiApp for AppServices {
    fn auth(&self) -> Arc<AuthService> {
        AppServices::auth(self)
    }

    fn modules(&self) -> Arc<ModuleService> {
        AppServices::modules(self)
    }

    fn quiz_sessions(&self) -> Arc<QuizSessionService> {
        AppServices::quiz_sessions(self)
    }

    fn quiz_authoring(&self) -> Arc<QuizAuthoringService> {
        AppServices::quiz_authoring(self)
    }

    fn catalog(&self) -> Arc<CatalogService> {
        AppServices::catalog(self)
    }
}

#[derive(Clone)]
pub struct AppContext {
    auth: Arc<AuthService>,
    modules: Arc<ModuleService>,
    quiz_sessions: Arc<QuizSessionService>,
    quiz_authoring: Arc<QuizAuthoringService>,
    catalog: Arc<CatalogService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            auth: app.auth(),
            modules: app.modules(),
            quiz_sessions: app.quiz_sessions(),
            quiz_authoring: app.quiz_authoring(),
            catalog: app.catalog(),
        }
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

    /// Copy the service-side auth state into the reactive mirror, e.g. after
    /// a call that may have signed the user out.
    pub fn sync_auth(&self, mut mirror: Signal<AuthState>) {
        if let Ok(current) = self.auth.state() {
            if *mirror.peek() != current {
                mirror.set(current);
            }
        }
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}

/// Reactive mirror of the signed-in state, provided by `App`.
#[must_use]
pub fn use_auth_state() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}
