//! Shared error types for the services crate.

use thiserror::Error;

use academy_core::model::{ChoiceId, ModuleError, QuestionId, QuizDraftError, UserError};
use api::ApiError;

use crate::quiz::QuizPhase;

/// Errors emitted by `QuizSession` and `QuizSessionService`.
///
/// Display strings are shown to the user as-is.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("cannot {operation} while the quiz is {phase}")]
    InvalidState {
        operation: &'static str,
        phase: QuizPhase,
    },

    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),

    #[error("choice {choice_id} is not an option for question {question_id}")]
    UnknownChoice {
        question_id: QuestionId,
        choice_id: ChoiceId,
    },

    #[error("answer at least one question before submitting")]
    NoAnswers,

    #[error("this module does not exist")]
    ModuleNotFound,

    #[error("this module has no quiz yet")]
    NoQuiz,

    #[error("could not load the quiz: {0}")]
    Load(ApiError),

    #[error("could not submit your answers, they are still here: {0}")]
    Submit(ApiError),
}

impl QuizSessionError {
    /// Classify a failed quiz fetch. A 404 whose detail mentions the quiz
    /// means the module exists without one.
    #[must_use]
    pub fn from_load(err: ApiError) -> Self {
        match &err {
            ApiError::NotFound(detail) if detail.to_lowercase().contains("quiz") => {
                QuizSessionError::NoQuiz
            }
            ApiError::NotFound(_) => QuizSessionError::ModuleNotFound,
            _ => QuizSessionError::Load(err),
        }
    }

    /// True when the failure came from an expired or missing session.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            QuizSessionError::Load(ApiError::Unauthorized)
                | QuizSessionError::Submit(ApiError::Unauthorized)
        )
    }
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("incorrect email/username or password")]
    InvalidCredentials,
    #[error("not signed in")]
    NotSignedIn,
    #[error("auth state is unavailable: {0}")]
    State(String),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `ModuleService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModuleServiceError {
    #[error("only instructors and administrators can change modules")]
    NotAuthor,
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `QuizAuthoringService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizAuthoringError {
    #[error("only instructors and administrators can edit quizzes")]
    NotAuthor,
    #[error(transparent)]
    Draft(#[from] QuizDraftError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}
