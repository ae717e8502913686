use std::sync::Arc;

use async_trait::async_trait;

use academy_core::model::{
    Answer, ChoiceDraft, KeyedQuestion, ModuleDraft, ModuleId, ModuleKind, QuestionDraft, Quiz,
    QuizDraft, QuizResult, Role,
};
use academy_core::time::fixed_clock;
use api::{ApiError, CredentialStore, InMemoryBackend, QuizApi};
use services::{
    AppServices, AuthState, Completion, GuardDecision, QuestionStatus, QuizPhase, QuizSession,
    QuizSessionError, QuizSessionService, guard,
};

fn draft(questions: usize) -> QuizDraft {
    QuizDraft {
        title: "Traits".into(),
        questions: (1..=questions)
            .map(|n| QuestionDraft {
                text: format!("Question {n}"),
                order: None,
                choices: vec![
                    ChoiceDraft {
                        text: "right".into(),
                        is_correct: true,
                        order: None,
                    },
                    ChoiceDraft {
                        text: "wrong".into(),
                        is_correct: false,
                        order: None,
                    },
                ],
            })
            .collect(),
    }
}

fn seeded(questions: usize) -> (InMemoryBackend, ModuleId) {
    let backend = InMemoryBackend::standalone().with_clock(fixed_clock());
    let module = backend
        .seed_module(ModuleDraft {
            title: "Traits".into(),
            content: "Shared behavior.".into(),
            kind: ModuleKind::Text,
        })
        .unwrap();
    if questions > 0 {
        backend.seed_quiz(module.id, &draft(questions)).unwrap();
    }
    backend.sign_in_as(Role::Student).unwrap();
    (backend, module.id)
}

fn pick(session: &mut QuizSession, index: usize, text: &str) {
    let question = session.quiz().unwrap().question_at(index).unwrap().clone();
    let choice = question
        .choices()
        .iter()
        .find(|c| c.text() == text)
        .unwrap()
        .id();
    session.select_answer(question.id(), choice).unwrap();
}

#[tokio::test]
async fn student_answers_part_of_the_quiz_and_gets_graded() {
    let (backend, module_id) = seeded(3);
    let services = AppServices::in_memory(backend.clone(), fixed_clock());
    let quizzes = services.quiz_sessions();

    let mut session = QuizSession::new(module_id);
    assert_eq!(quizzes.load(&mut session).await, Completion::Applied);
    assert_eq!(session.phase(), QuizPhase::Active);
    assert_eq!(session.question_count(), 3);

    pick(&mut session, 0, "right");
    session.next().unwrap();
    pick(&mut session, 1, "wrong");
    assert_eq!(session.answered_count(), 2);
    assert_eq!(session.navigator()[2].status, QuestionStatus::Unanswered);

    let completion = quizzes.submit(&mut session).await.unwrap();
    assert_eq!(completion, Completion::Applied);
    assert_eq!(session.phase(), QuizPhase::Reviewing);

    let result = session.result().unwrap();
    assert_eq!(result.total(), 3);
    assert_eq!(result.correct(), 1);
    assert!((result.score_percentage() - 33.33).abs() < 1e-9);
    let skipped = session.quiz().unwrap().question_at(2).unwrap().id();
    assert!(result.detail_for(skipped).unwrap().is_unanswered());

    let sent = backend.submissions().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.len(), 2);
}

#[tokio::test]
async fn failed_submission_keeps_answers_for_another_try() {
    let (backend, module_id) = seeded(2);
    let services = AppServices::in_memory(backend.clone(), fixed_clock());
    let quizzes = services.quiz_sessions();

    let mut session = QuizSession::new(module_id);
    let _ = quizzes.load(&mut session).await;
    pick(&mut session, 0, "right");
    pick(&mut session, 1, "right");

    backend
        .fail_next_submit(ApiError::Network("connection reset".into()))
        .unwrap();
    let _ = quizzes.submit(&mut session).await.unwrap();
    assert_eq!(session.phase(), QuizPhase::Active);
    assert!(matches!(session.error(), Some(QuizSessionError::Submit(_))));
    assert_eq!(session.answered_count(), 2);

    let _ = quizzes.submit(&mut session).await.unwrap();
    assert_eq!(session.phase(), QuizPhase::Reviewing);
    assert!(session.error().is_none());
    assert_eq!(session.result().unwrap().correct(), 2);
}

#[tokio::test]
async fn token_expiring_mid_quiz_sends_the_student_to_login() {
    let (backend, module_id) = seeded(2);
    let services = AppServices::in_memory(backend.clone(), fixed_clock());
    let auth = services.auth();
    let _ = auth.init().await.unwrap();
    let quizzes = services.quiz_sessions();

    let mut session = QuizSession::new(module_id);
    let _ = quizzes.load(&mut session).await;
    pick(&mut session, 0, "right");
    backend.expire_tokens().unwrap();

    let _ = quizzes.submit(&mut session).await.unwrap();
    assert!(session.error().unwrap().is_unauthorized());

    let _ = auth.absorb(ApiError::Unauthorized).unwrap();
    let state = auth.state().unwrap();
    assert_eq!(state, AuthState::Expired);
    assert_eq!(guard(&state, &[]), GuardDecision::RedirectLogin);
    assert!(backend.credentials().load().unwrap().is_none());
}

#[tokio::test]
async fn submitting_nothing_is_refused_locally() {
    let (backend, module_id) = seeded(2);
    let services = AppServices::in_memory(backend.clone(), fixed_clock());
    let quizzes = services.quiz_sessions();

    let mut session = QuizSession::new(module_id);
    let _ = quizzes.load(&mut session).await;
    let err = quizzes.submit(&mut session).await.unwrap_err();
    assert_eq!(err, QuizSessionError::NoAnswers);
    assert_eq!(session.phase(), QuizPhase::Active);
    assert!(backend.submissions().unwrap().is_empty());
}

#[tokio::test]
async fn missing_quiz_and_missing_module_are_told_apart() {
    let (backend, module_id) = seeded(0);
    let services = AppServices::in_memory(backend, fixed_clock());
    let quizzes = services.quiz_sessions();

    let mut without_quiz = QuizSession::new(module_id);
    let _ = quizzes.load(&mut without_quiz).await;
    assert_eq!(without_quiz.phase(), QuizPhase::LoadFailed);
    assert_eq!(without_quiz.error(), Some(&QuizSessionError::NoQuiz));

    let mut unknown = QuizSession::new(ModuleId::new(999));
    let _ = quizzes.load(&mut unknown).await;
    assert_eq!(unknown.error(), Some(&QuizSessionError::ModuleNotFound));
}

#[tokio::test]
async fn retry_reuses_the_loaded_quiz() {
    let (backend, module_id) = seeded(2);
    let services = AppServices::in_memory(backend.clone(), fixed_clock());
    let quizzes = services.quiz_sessions();

    let mut session = QuizSession::new(module_id);
    let _ = quizzes.load(&mut session).await;
    pick(&mut session, 0, "wrong");
    let _ = quizzes.submit(&mut session).await.unwrap();

    quizzes.retry(&mut session).unwrap();
    assert_eq!(session.phase(), QuizPhase::Active);
    assert_eq!(session.answered_count(), 0);
    assert_eq!(session.current_index(), 0);
    assert!(session.result().is_none());
    assert_eq!(backend.quiz_fetch_count().unwrap(), 1);
}

/// Serves one quiz and refuses every submission as unauthorized.
struct ExpiredSession {
    quiz: Quiz,
}

#[async_trait]
impl QuizApi for ExpiredSession {
    async fn fetch_quiz(&self, _module_id: ModuleId) -> Result<Quiz, ApiError> {
        Ok(self.quiz.clone())
    }

    async fn submit_answers(
        &self,
        _module_id: ModuleId,
        _answers: &[Answer],
    ) -> Result<QuizResult, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn create_quiz(&self, _module_id: ModuleId, _draft: &QuizDraft) -> Result<Quiz, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn update_quiz(&self, _module_id: ModuleId, _draft: &QuizDraft) -> Result<Quiz, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn delete_quiz(&self, _module_id: ModuleId) -> Result<(), ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn answer_key(&self, _module_id: ModuleId) -> Result<Vec<KeyedQuestion>, ApiError> {
        Err(ApiError::Unauthorized)
    }
}

#[tokio::test]
async fn expired_session_surfaces_as_unauthorized_submit_error() {
    let (backend, module_id) = seeded(2);
    let quiz = backend.fetch_quiz(module_id).await.unwrap();
    let quizzes = QuizSessionService::new(fixed_clock(), Arc::new(ExpiredSession { quiz }));

    let mut session = QuizSession::new(module_id);
    let _ = quizzes.load(&mut session).await;
    pick(&mut session, 0, "right");
    let _ = quizzes.submit(&mut session).await.unwrap();

    let err = session.error().unwrap();
    assert!(err.is_unauthorized());
    let first = session.quiz().unwrap().questions()[0].id();
    assert!(session.selected_choice(first).is_some());
}
