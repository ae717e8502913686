use academy_core::model::{
    Answer, Course, Health, KeyedQuestion, LoginRequest, Module, ModuleDraft, ModuleId,
    ModulePatch, ModuleStats, ModuleSummary, ProfilePatch, Quiz, QuizDraft, QuizResult,
    RegisterRequest, User, UserId, UserPublic,
};
use async_trait::async_trait;

use crate::credentials::AccessToken;
use crate::error::ApiError;

/// Quiz endpoints: taking a quiz and authoring one.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Fetch the quiz attached to a module, without the answer key.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the module or its quiz is missing.
    async fn fetch_quiz(&self, module_id: ModuleId) -> Result<Quiz, ApiError>;

    /// Submit one choice per answered question and receive the graded result.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the submission is rejected or the request fails.
    async fn submit_answers(
        &self,
        module_id: ModuleId,
        answers: &[Answer],
    ) -> Result<QuizResult, ApiError>;

    /// Attach a new quiz to a module.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-authors and `ApiError::Rejected`
    /// if the module already has a quiz.
    async fn create_quiz(&self, module_id: ModuleId, draft: &QuizDraft) -> Result<Quiz, ApiError>;

    /// Replace a module's quiz.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-authors and `ApiError::NotFound`
    /// if there is no quiz to replace.
    async fn update_quiz(&self, module_id: ModuleId, draft: &QuizDraft) -> Result<Quiz, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-authors and `ApiError::NotFound`
    /// if there is no quiz.
    async fn delete_quiz(&self, module_id: ModuleId) -> Result<(), ApiError>;

    /// Questions with their correct choices flagged. Authors only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-authors.
    async fn answer_key(&self, module_id: ModuleId) -> Result<Vec<KeyedQuestion>, ApiError>;
}

#[async_trait]
pub trait ModuleApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    async fn list_modules(&self, skip: u32, limit: u32) -> Result<Vec<ModuleSummary>, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if missing.
    async fn get_module(&self, id: ModuleId) -> Result<Module, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-authors.
    async fn create_module(&self, draft: &ModuleDraft) -> Result<Module, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-authors or `ApiError::NotFound`.
    async fn update_module(&self, id: ModuleId, patch: &ModulePatch) -> Result<Module, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-authors or `ApiError::NotFound`.
    async fn delete_module(&self, id: ModuleId) -> Result<(), ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    async fn module_stats(&self) -> Result<ModuleStats, ApiError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a bearer token. Does not store it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for wrong credentials.
    async fn login(&self, request: &LoginRequest) -> Result<AccessToken, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the email or username is taken.
    async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError>;

    /// The account behind the stored token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without a valid token.
    async fn current_user(&self) -> Result<User, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the new email or username is taken.
    async fn update_profile(&self, patch: &ProfilePatch) -> Result<User, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if missing.
    async fn user_profile(&self, id: UserId) -> Result<UserPublic, ApiError>;
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    async fn courses(&self) -> Result<Vec<Course>, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` if the backend is unreachable.
    async fn health(&self) -> Result<Health, ApiError>;
}

/// Everything the client needs from a backend.
pub trait Backend: QuizApi + ModuleApi + AuthApi + CatalogApi {}

impl<T> Backend for T where T: QuizApi + ModuleApi + AuthApi + CatalogApi {}
