use std::sync::Arc;

use tracing::{info, instrument};

use academy_core::model::{KeyedQuestion, ModuleId, Quiz, QuizDraft};
use api::{ApiError, QuizApi};

use crate::auth::AuthService;
use crate::error::QuizAuthoringError;

/// Instructor-side quiz editing. Every call requires an author role.
#[derive(Clone)]
pub struct QuizAuthoringService {
    quizzes: Arc<dyn QuizApi>,
    auth: AuthService,
}

impl QuizAuthoringService {
    #[must_use]
    pub fn new(quizzes: Arc<dyn QuizApi>, auth: AuthService) -> Self {
        Self { quizzes, auth }
    }

    /// Attach a new quiz to a module.
    ///
    /// # Errors
    ///
    /// Returns `QuizAuthoringError::NotAuthor`, `QuizAuthoringError::Draft` for an
    /// invalid draft, or `QuizAuthoringError::Api`.
    #[instrument(skip(self, draft), fields(questions = draft.questions.len()))]
    pub async fn create_quiz(
        &self,
        module_id: ModuleId,
        draft: &QuizDraft,
    ) -> Result<Quiz, QuizAuthoringError> {
        self.ensure_author()?;
        draft.validate()?;
        let quiz = self
            .quizzes
            .create_quiz(module_id, draft)
            .await
            .map_err(|e| self.absorb(e))?;
        info!(quiz_id = %quiz.id(), "quiz created");
        Ok(quiz)
    }

    /// Replace a module's quiz with the draft.
    ///
    /// # Errors
    ///
    /// Same as [`QuizAuthoringService::create_quiz`].
    #[instrument(skip(self, draft), fields(questions = draft.questions.len()))]
    pub async fn update_quiz(
        &self,
        module_id: ModuleId,
        draft: &QuizDraft,
    ) -> Result<Quiz, QuizAuthoringError> {
        self.ensure_author()?;
        draft.validate()?;
        let quiz = self
            .quizzes
            .update_quiz(module_id, draft)
            .await
            .map_err(|e| self.absorb(e))?;
        info!(quiz_id = %quiz.id(), "quiz replaced");
        Ok(quiz)
    }

    /// # Errors
    ///
    /// Returns `QuizAuthoringError::NotAuthor` or `QuizAuthoringError::Api`.
    #[instrument(skip(self))]
    pub async fn delete_quiz(&self, module_id: ModuleId) -> Result<(), QuizAuthoringError> {
        self.ensure_author()?;
        self.quizzes
            .delete_quiz(module_id)
            .await
            .map_err(|e| self.absorb(e))?;
        info!("quiz deleted");
        Ok(())
    }

    /// Questions with their correct choices marked.
    ///
    /// # Errors
    ///
    /// Returns `QuizAuthoringError::NotAuthor` or `QuizAuthoringError::Api`.
    pub async fn answer_key(
        &self,
        module_id: ModuleId,
    ) -> Result<Vec<KeyedQuestion>, QuizAuthoringError> {
        self.ensure_author()?;
        let key = self
            .quizzes
            .answer_key(module_id)
            .await
            .map_err(|e| self.absorb(e))?;
        Ok(key)
    }

    fn ensure_author(&self) -> Result<(), QuizAuthoringError> {
        match self.auth.current_user() {
            Some(user) if user.role.can_author() => Ok(()),
            _ => Err(QuizAuthoringError::NotAuthor),
        }
    }

    fn absorb(&self, err: ApiError) -> QuizAuthoringError {
        if err.is_unauthorized() {
            let _ = self.auth.absorb(err.clone());
        }
        QuizAuthoringError::Api(err)
    }
}
