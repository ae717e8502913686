use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use academy_core::model::{Answer, ModuleId, Quiz, QuizResult};
use api::{ApiError, QuizApi};

use super::state::{Completion, QuizSession};
use crate::error::QuizSessionError;
use crate::Clock;

/// Drives `QuizSession` transitions against the quiz API.
///
/// `load` and `submit` hold the session for the whole round-trip. UI code
/// that keeps the session in reactive state uses the `begin_*`/`complete_*`
/// steps on the session with `fetch_quiz`/`send_answers` in between.
#[derive(Clone)]
pub struct QuizSessionService {
    clock: Clock,
    quizzes: Arc<dyn QuizApi>,
}

impl QuizSessionService {
    #[must_use]
    pub fn new(clock: Clock, quizzes: Arc<dyn QuizApi>) -> Self {
        Self { clock, quizzes }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Fetch the quiz definition for `module_id`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the quiz cannot be fetched.
    pub async fn fetch_quiz(&self, module_id: ModuleId) -> Result<Quiz, ApiError> {
        self.quizzes.fetch_quiz(module_id).await
    }

    /// Send answered entries for grading.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the submission fails.
    pub async fn send_answers(
        &self,
        module_id: ModuleId,
        answers: &[Answer],
    ) -> Result<QuizResult, ApiError> {
        self.quizzes.submit_answers(module_id, answers).await
    }

    /// Load (or reload) the session's quiz. Failures end up in
    /// `session.error()`.
    #[instrument(skip(self, session), fields(module_id = %session.module_id()))]
    pub async fn load(&self, session: &mut QuizSession) -> Completion {
        let ticket = session.begin_load();
        let outcome = self.fetch_quiz(session.module_id()).await;
        if let Err(err) = &outcome {
            warn!(error = %err, "quiz load failed");
        }
        let completion = session.complete_load(ticket, outcome, self.clock.now());
        debug!(phase = %session.phase(), ?completion, "quiz load finished");
        completion
    }

    /// Submit answered questions. A network failure leaves the session
    /// `Active` with the error recorded rather than returning it.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError` when the session cannot be submitted at all
    /// (wrong phase or nothing answered).
    #[instrument(skip(self, session), fields(module_id = %session.module_id()))]
    pub async fn submit(&self, session: &mut QuizSession) -> Result<Completion, QuizSessionError> {
        let (ticket, answers) = session.begin_submit(self.clock.now())?;
        let outcome = self.send_answers(session.module_id(), &answers).await;
        match &outcome {
            Ok(result) => info!(
                answered = answers.len(),
                correct = result.correct(),
                total = result.total(),
                "quiz graded"
            ),
            Err(err) => warn!(error = %err, "quiz submission failed"),
        }
        Ok(session.complete_submit(ticket, outcome))
    }

    /// Restart a reviewed attempt without refetching the quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::InvalidState` unless the session is in review.
    pub fn retry(&self, session: &mut QuizSession) -> Result<(), QuizSessionError> {
        session.retry(self.clock.now())?;
        debug!(module_id = %session.module_id(), "quiz attempt restarted");
        Ok(())
    }

    /// Update elapsed time from the service clock.
    pub fn tick(&self, session: &mut QuizSession) -> bool {
        session.tick(self.clock.now())
    }
}
