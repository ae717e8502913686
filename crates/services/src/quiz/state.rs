use std::fmt;

use chrono::{DateTime, Utc};

use academy_core::model::{Answer, ChoiceId, ModuleId, Question, QuestionId, Quiz, QuizResult};
use academy_core::time::whole_seconds_between;
use api::ApiError;

use super::progress::{NavigatorDot, QuestionStatus, QuizProgress};
use crate::error::QuizSessionError;

/// Lifecycle phase of a quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Loading,
    LoadFailed,
    Active,
    Submitting,
    Reviewing,
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuizPhase::Loading => "loading",
            QuizPhase::LoadFailed => "unavailable",
            QuizPhase::Active => "in progress",
            QuizPhase::Submitting => "being submitted",
            QuizPhase::Reviewing => "in review",
        };
        f.write_str(name)
    }
}

/// Handle for one in-flight load or submit.
///
/// A completion is applied only while its ticket is still the latest one
/// issued and the session is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// What happened to a network outcome handed back to the session.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The ticket was superseded or the session detached; state is untouched.
    Discarded,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at a module's quiz.
///
/// Pure state: network calls happen outside and are fed back through the
/// `complete_*` methods, so the session can live in UI state across awaits.
#[derive(Debug, Clone)]
pub struct QuizSession {
    module_id: ModuleId,
    phase: QuizPhase,
    quiz: Option<Quiz>,
    /// One slot per question, in quiz order. `None` is unanswered.
    answers: Vec<(QuestionId, Option<ChoiceId>)>,
    current: usize,
    started_at: Option<DateTime<Utc>>,
    time_spent_seconds: u64,
    result: Option<QuizResult>,
    error: Option<QuizSessionError>,
    epoch: u64,
    detached: bool,
}

impl QuizSession {
    /// A session waiting for its quiz definition.
    #[must_use]
    pub fn new(module_id: ModuleId) -> Self {
        Self {
            module_id,
            phase: QuizPhase::Loading,
            quiz: None,
            answers: Vec::new(),
            current: 0,
            started_at: None,
            time_spent_seconds: 0,
            result: None,
            error: None,
            epoch: 0,
            detached: false,
        }
    }

    //
    // ─── LOADING ───────────────────────────────────────────────────────────────
    //

    /// Start (or restart after a failure) fetching the quiz.
    pub fn begin_load(&mut self) -> Ticket {
        self.phase = QuizPhase::Loading;
        self.quiz = None;
        self.answers.clear();
        self.result = None;
        self.error = None;
        self.started_at = None;
        self.time_spent_seconds = 0;
        self.current = 0;
        self.next_ticket()
    }

    /// Apply the outcome of a quiz fetch.
    pub fn complete_load(
        &mut self,
        ticket: Ticket,
        outcome: Result<Quiz, ApiError>,
        now: DateTime<Utc>,
    ) -> Completion {
        if !self.accepts(ticket) || self.phase != QuizPhase::Loading {
            return Completion::Discarded;
        }
        match outcome {
            Ok(quiz) => {
                self.quiz = Some(quiz);
                self.reset_attempt(now);
            }
            Err(err) => {
                self.phase = QuizPhase::LoadFailed;
                self.error = Some(QuizSessionError::from_load(err));
            }
        }
        Completion::Applied
    }

    //
    // ─── ANSWERING ─────────────────────────────────────────────────────────────
    //

    /// Record `choice_id` as the answer to `question_id`, replacing any
    /// earlier choice. Does not move the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::InvalidState` outside `Active`, or
    /// `UnknownQuestion`/`UnknownChoice` for ids not in the quiz.
    pub fn select_answer(
        &mut self,
        question_id: QuestionId,
        choice_id: ChoiceId,
    ) -> Result<(), QuizSessionError> {
        self.require_active("answer")?;
        let question = self
            .quiz
            .as_ref()
            .and_then(|quiz| quiz.question(question_id))
            .ok_or(QuizSessionError::UnknownQuestion(question_id))?;
        if !question.has_choice(choice_id) {
            return Err(QuizSessionError::UnknownChoice {
                question_id,
                choice_id,
            });
        }
        if let Some(slot) = self.answers.iter_mut().find(|(id, _)| *id == question_id) {
            slot.1 = Some(choice_id);
        }
        Ok(())
    }

    /// Jump to `index`, clamped to the last question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::InvalidState` outside `Active`.
    pub fn go_to_question(&mut self, index: usize) -> Result<(), QuizSessionError> {
        self.require_active("navigate")?;
        self.current = index.min(self.question_count().saturating_sub(1));
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizSessionError::InvalidState` outside `Active`.
    pub fn next(&mut self) -> Result<(), QuizSessionError> {
        self.go_to_question(self.current.saturating_add(1))
    }

    /// # Errors
    ///
    /// Returns `QuizSessionError::InvalidState` outside `Active`.
    pub fn previous(&mut self) -> Result<(), QuizSessionError> {
        self.go_to_question(self.current.saturating_sub(1))
    }

    /// Recompute elapsed time. Only moves while `Active`; returns whether the
    /// displayed value changed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase != QuizPhase::Active {
            return false;
        }
        let Some(started_at) = self.started_at else {
            return false;
        };
        let elapsed = whole_seconds_between(started_at, now).max(self.time_spent_seconds);
        let changed = elapsed != self.time_spent_seconds;
        self.time_spent_seconds = elapsed;
        changed
    }

    //
    // ─── SUBMITTING ────────────────────────────────────────────────────────────
    //

    /// Freeze the clock and hand out the answered entries to send.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::InvalidState` outside `Active` and
    /// `QuizSessionError::NoAnswers` when nothing has been answered.
    pub fn begin_submit(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<(Ticket, Vec<Answer>), QuizSessionError> {
        self.require_active("submit")?;
        let answers = self.submission();
        if answers.is_empty() {
            return Err(QuizSessionError::NoAnswers);
        }
        let _ = self.tick(now);
        self.phase = QuizPhase::Submitting;
        self.error = None;
        Ok((self.next_ticket(), answers))
    }

    /// Apply the outcome of a submission. On failure the attempt goes back
    /// to `Active` with every answer kept and the error recorded.
    pub fn complete_submit(
        &mut self,
        ticket: Ticket,
        outcome: Result<QuizResult, ApiError>,
    ) -> Completion {
        if !self.accepts(ticket) || self.phase != QuizPhase::Submitting {
            return Completion::Discarded;
        }
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.phase = QuizPhase::Reviewing;
            }
            Err(err) => {
                self.error = Some(QuizSessionError::Submit(err));
                self.phase = QuizPhase::Active;
            }
        }
        Completion::Applied
    }

    /// Start over with the same quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::InvalidState` outside `Reviewing`.
    pub fn retry(&mut self, now: DateTime<Utc>) -> Result<(), QuizSessionError> {
        if self.phase != QuizPhase::Reviewing {
            return Err(QuizSessionError::InvalidState {
                operation: "retry",
                phase: self.phase,
            });
        }
        self.next_ticket();
        self.reset_attempt(now);
        Ok(())
    }

    /// Mark the owning view as gone. Pending completions are discarded.
    pub fn detach(&mut self) {
        self.detached = true;
        self.next_ticket();
    }

    /// Drop the last error message, e.g. once it has been dismissed.
    pub fn clear_error(&mut self) {
        if self.phase != QuizPhase::LoadFailed {
            self.error = None;
        }
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    /// Last load or submit failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&QuizSessionError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.as_ref()?.question_at(self.current)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.quiz.as_ref().map_or(0, Quiz::question_count)
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.question_count()
    }

    /// Every question in quiz order with its selection.
    #[must_use]
    pub fn answers(&self) -> &[(QuestionId, Option<ChoiceId>)] {
        &self.answers
    }

    #[must_use]
    pub fn selected_choice(&self, question_id: QuestionId) -> Option<ChoiceId> {
        self.answers
            .iter()
            .find(|(id, _)| *id == question_id)
            .and_then(|(_, choice)| *choice)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|(_, c)| c.is_some()).count()
    }

    /// Answered entries only, as they would be sent.
    #[must_use]
    pub fn submission(&self) -> Vec<Answer> {
        self.answers
            .iter()
            .filter_map(|(question_id, choice)| {
                choice.map(|choice_id| Answer {
                    question_id: *question_id,
                    choice_id,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase == QuizPhase::Active && self.answered_count() > 0
    }

    #[must_use]
    pub fn time_spent_seconds(&self) -> u64 {
        self.time_spent_seconds
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress::new(self.current, self.question_count(), self.answered_count())
    }

    /// Status dot per question for the navigator strip.
    #[must_use]
    pub fn navigator(&self) -> Vec<NavigatorDot> {
        self.answers
            .iter()
            .enumerate()
            .map(|(index, (question_id, choice))| NavigatorDot {
                index,
                question_id: *question_id,
                status: if index == self.current {
                    QuestionStatus::Current
                } else if choice.is_some() {
                    QuestionStatus::Answered
                } else {
                    QuestionStatus::Unanswered
                },
            })
            .collect()
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    fn reset_attempt(&mut self, now: DateTime<Utc>) {
        self.answers = self
            .quiz
            .as_ref()
            .map(|quiz| quiz.questions().iter().map(|q| (q.id(), None)).collect())
            .unwrap_or_default();
        self.current = 0;
        self.result = None;
        self.error = None;
        self.started_at = Some(now);
        self.time_spent_seconds = 0;
        self.phase = QuizPhase::Active;
    }

    fn require_active(&self, operation: &'static str) -> Result<(), QuizSessionError> {
        if self.phase == QuizPhase::Active {
            Ok(())
        } else {
            Err(QuizSessionError::InvalidState {
                operation,
                phase: self.phase,
            })
        }
    }

    fn next_ticket(&mut self) -> Ticket {
        self.epoch += 1;
        Ticket(self.epoch)
    }

    fn accepts(&self, ticket: Ticket) -> bool {
        !self.detached && ticket.0 == self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::model::{Choice, ChoiceRef, QuestionResult, QuizId};
    use academy_core::time::fixed_now;
    use chrono::Duration;

    fn quiz(questions: u64) -> Quiz {
        let questions = (1..=questions)
            .map(|q| {
                let choices = (1..=3)
                    .map(|c| Choice::new(ChoiceId::new(q * 10 + c), format!("choice {c}"), None))
                    .collect();
                Question::new(QuestionId::new(q), format!("question {q}"), None, choices).unwrap()
            })
            .collect();
        Quiz::new(QuizId::new(1), ModuleId::new(7), "Quiz", questions).unwrap()
    }

    fn active(questions: u64) -> QuizSession {
        let mut session = QuizSession::new(ModuleId::new(7));
        let ticket = session.begin_load();
        let _ = session.complete_load(ticket, Ok(quiz(questions)), fixed_now());
        session
    }

    fn graded(total: u32, correct: u32) -> QuizResult {
        let detail = QuestionResult {
            question_id: QuestionId::new(1),
            question_text: "question 1".into(),
            selected: Some(ChoiceRef {
                id: ChoiceId::new(11),
                text: "choice 1".into(),
            }),
            correct: ChoiceRef {
                id: ChoiceId::new(11),
                text: "choice 1".into(),
            },
            is_correct: true,
        };
        let score = f64::from(correct) / f64::from(total) * 100.0;
        QuizResult::new(total, correct, score, vec![detail]).unwrap()
    }

    fn q(id: u64) -> QuestionId {
        QuestionId::new(id)
    }

    fn c(id: u64) -> ChoiceId {
        ChoiceId::new(id)
    }

    #[test]
    fn load_creates_one_unanswered_entry_per_question() {
        for n in [1, 3, 8] {
            let session = active(n);
            assert_eq!(session.phase(), QuizPhase::Active);
            assert_eq!(session.answers().len(), n as usize);
            assert!(session.answers().iter().all(|(_, choice)| choice.is_none()));
            assert_eq!(session.answered_count(), 0);
        }
    }

    #[test]
    fn load_failure_is_terminal_and_classified() {
        let mut session = QuizSession::new(ModuleId::new(7));
        let ticket = session.begin_load();
        let applied = session.complete_load(
            ticket,
            Err(ApiError::NotFound("Aucun quiz trouvé pour ce module".into())),
            fixed_now(),
        );
        assert_eq!(applied, Completion::Applied);
        assert_eq!(session.phase(), QuizPhase::LoadFailed);
        assert_eq!(session.error(), Some(&QuizSessionError::NoQuiz));
        assert!(!session.tick(fixed_now() + Duration::seconds(5)));
        assert!(session.select_answer(q(1), c(11)).is_err());
    }

    #[test]
    fn selecting_same_choice_twice_is_idempotent() {
        let mut session = active(3);
        session.select_answer(q(2), c(21)).unwrap();
        let before = session.answers().to_vec();
        session.select_answer(q(2), c(21)).unwrap();
        assert_eq!(session.answers(), before.as_slice());
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn reselecting_replaces_previous_choice() {
        let mut session = active(3);
        session.select_answer(q(2), c(21)).unwrap();
        session.select_answer(q(2), c(23)).unwrap();

        let entries: Vec<_> = session.answers().iter().filter(|(id, _)| *id == q(2)).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(session.selected_choice(q(2)), Some(c(23)));
    }

    #[test]
    fn selecting_does_not_move_current_question() {
        let mut session = active(3);
        session.select_answer(q(3), c(31)).unwrap();
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut session = active(2);
        assert_eq!(
            session.select_answer(q(9), c(11)),
            Err(QuizSessionError::UnknownQuestion(q(9)))
        );
        assert_eq!(
            session.select_answer(q(1), c(21)),
            Err(QuizSessionError::UnknownChoice {
                question_id: q(1),
                choice_id: c(21)
            })
        );
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn navigation_clamps_without_wrapping() {
        let mut session = active(3);
        session.previous().unwrap();
        assert_eq!(session.current_index(), 0);

        session.go_to_question(50).unwrap();
        assert_eq!(session.current_index(), 2);
        assert!(session.is_last());
        session.next().unwrap();
        assert_eq!(session.current_index(), 2);

        session.previous().unwrap();
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn submission_only_includes_answered_questions() {
        let mut session = active(3);
        session.select_answer(q(1), c(12)).unwrap();
        session.select_answer(q(3), c(33)).unwrap();

        let (_, payload) = session.begin_submit(fixed_now()).unwrap();
        assert_eq!(
            payload,
            vec![
                Answer {
                    question_id: q(1),
                    choice_id: c(12)
                },
                Answer {
                    question_id: q(3),
                    choice_id: c(33)
                },
            ]
        );
        assert_eq!(session.phase(), QuizPhase::Submitting);
    }

    #[test]
    fn zero_answer_submit_is_rejected() {
        let mut session = active(2);
        assert!(!session.can_submit());
        assert_eq!(
            session.begin_submit(fixed_now()).unwrap_err(),
            QuizSessionError::NoAnswers
        );
        assert_eq!(session.phase(), QuizPhase::Active);
    }

    #[test]
    fn successful_submit_moves_to_review() {
        let mut session = active(5);
        session.select_answer(q(1), c(11)).unwrap();
        let (ticket, _) = session.begin_submit(fixed_now()).unwrap();

        let applied = session.complete_submit(ticket, Ok(graded(5, 4)));
        assert_eq!(applied, Completion::Applied);
        assert_eq!(session.phase(), QuizPhase::Reviewing);
        assert!(session.is_submitted());
        let result = session.result().unwrap();
        assert!((result.score_percentage() - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn failed_submit_returns_to_active_with_answers_intact() {
        let mut session = active(3);
        session.select_answer(q(1), c(11)).unwrap();
        session.select_answer(q(2), c(22)).unwrap();
        session.go_to_question(2).unwrap();
        let before = session.answers().to_vec();

        let (ticket, _) = session.begin_submit(fixed_now()).unwrap();
        let _ = session.complete_submit(ticket, Err(ApiError::Network("connection reset".into())));

        assert_eq!(session.phase(), QuizPhase::Active);
        assert_eq!(session.answers(), before.as_slice());
        assert_eq!(session.current_index(), 2);
        assert!(matches!(session.error(), Some(QuizSessionError::Submit(_))));
        assert!(!session.is_submitted());
    }

    #[test]
    fn timing_advances_while_active_and_freezes_on_submit() {
        let start = fixed_now();
        let mut session = active(2);
        assert!(session.tick(start + Duration::milliseconds(1500)));
        assert_eq!(session.time_spent_seconds(), 1);
        assert!(!session.tick(start + Duration::milliseconds(1900)));

        session.select_answer(q(1), c(11)).unwrap();
        let (ticket, _) = session.begin_submit(start + Duration::seconds(42)).unwrap();
        assert_eq!(session.time_spent_seconds(), 42);

        assert!(!session.tick(start + Duration::seconds(60)));
        let _ = session.complete_submit(ticket, Ok(graded(2, 1)));
        assert!(!session.tick(start + Duration::seconds(90)));
        assert_eq!(session.time_spent_seconds(), 42);
    }

    #[test]
    fn clock_going_backwards_never_decreases_elapsed_time() {
        let start = fixed_now();
        let mut session = active(1);
        session.tick(start + Duration::seconds(10));
        session.tick(start + Duration::seconds(3));
        assert_eq!(session.time_spent_seconds(), 10);
    }

    #[test]
    fn retry_matches_a_fresh_load() {
        let later = fixed_now() + Duration::minutes(5);
        let mut session = active(3);
        session.select_answer(q(1), c(11)).unwrap();
        session.go_to_question(2).unwrap();
        let (ticket, _) = session.begin_submit(fixed_now() + Duration::seconds(30)).unwrap();
        let _ = session.complete_submit(ticket, Ok(graded(3, 1)));

        session.retry(later).unwrap();

        let mut fresh = QuizSession::new(ModuleId::new(7));
        let ticket = fresh.begin_load();
        let _ = fresh.complete_load(ticket, Ok(quiz(3)), later);

        assert_eq!(session.phase(), fresh.phase());
        assert_eq!(session.answers(), fresh.answers());
        assert_eq!(session.current_index(), fresh.current_index());
        assert_eq!(session.time_spent_seconds(), fresh.time_spent_seconds());
        assert_eq!(session.result(), fresh.result());
        assert_eq!(session.error(), fresh.error());
        assert_eq!(session.quiz(), fresh.quiz());

        assert!(session.tick(later + Duration::seconds(2)));
        assert_eq!(session.time_spent_seconds(), 2);
    }

    #[test]
    fn retry_only_from_review() {
        let mut session = active(2);
        assert!(matches!(
            session.retry(fixed_now()),
            Err(QuizSessionError::InvalidState {
                operation: "retry",
                phase: QuizPhase::Active
            })
        ));
    }

    #[test]
    fn completion_after_detach_is_discarded() {
        let mut session = QuizSession::new(ModuleId::new(7));
        let ticket = session.begin_load();
        session.detach();
        let outcome = session.complete_load(ticket, Ok(quiz(2)), fixed_now());
        assert_eq!(outcome, Completion::Discarded);
        assert_eq!(session.phase(), QuizPhase::Loading);
        assert!(session.quiz().is_none());
    }

    #[test]
    fn stale_submit_completion_is_discarded() {
        let mut session = active(2);
        session.select_answer(q(1), c(11)).unwrap();
        let (stale, _) = session.begin_submit(fixed_now()).unwrap();
        session.detach();

        assert_eq!(
            session.complete_submit(stale, Ok(graded(2, 1))),
            Completion::Discarded
        );
        assert_eq!(session.phase(), QuizPhase::Submitting);
        assert!(session.result().is_none());
    }

    #[test]
    fn reload_supersedes_earlier_load() {
        let mut session = QuizSession::new(ModuleId::new(7));
        let first = session.begin_load();
        let second = session.begin_load();

        assert_eq!(
            session.complete_load(first, Ok(quiz(5)), fixed_now()),
            Completion::Discarded
        );
        assert_eq!(
            session.complete_load(second, Ok(quiz(2)), fixed_now()),
            Completion::Applied
        );
        assert_eq!(session.question_count(), 2);
    }

    #[test]
    fn progress_tracks_position_not_answers() {
        let mut session = active(4);
        session.select_answer(q(4), c(41)).unwrap();
        session.select_answer(q(3), c(31)).unwrap();
        session.go_to_question(1).unwrap();

        let progress = session.progress();
        assert_eq!(progress.answered, 2);
        assert!((progress.percentage - 50.0).abs() < f64::EPSILON);

        let statuses: Vec<_> = session.navigator().iter().map(|d| d.status).collect();
        assert_eq!(
            statuses,
            vec![
                QuestionStatus::Unanswered,
                QuestionStatus::Current,
                QuestionStatus::Answered,
                QuestionStatus::Answered,
            ]
        );
    }

    #[test]
    fn operations_outside_active_are_rejected() {
        let mut session = QuizSession::new(ModuleId::new(7));
        assert!(matches!(
            session.next(),
            Err(QuizSessionError::InvalidState {
                operation: "navigate",
                phase: QuizPhase::Loading
            })
        ));
        assert!(session.begin_submit(fixed_now()).is_err());
    }
}
