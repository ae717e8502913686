use std::sync::Arc;

use academy_core::model::{
    Answer, ChoiceDraft, LoginRequest, ModuleDraft, ModuleKind, ModulePatch, ProfilePatch,
    QuestionDraft, QuizDraft, RegisterRequest, Role,
};
use academy_core::time::fixed_clock;
use api::{
    AuthApi, Backend, CredentialStore, Credentials, FileCredentialStore, InMemoryBackend,
    ModuleApi, QuizApi,
};

fn quiz_draft(questions: usize) -> QuizDraft {
    QuizDraft {
        title: "Ownership".into(),
        questions: (1..=questions)
            .map(|n| QuestionDraft {
                text: format!("Question {n}"),
                order: None,
                choices: vec![
                    ChoiceDraft {
                        text: "yes".into(),
                        is_correct: true,
                        order: None,
                    },
                    ChoiceDraft {
                        text: "no".into(),
                        is_correct: false,
                        order: None,
                    },
                ],
            })
            .collect(),
    }
}

#[tokio::test]
async fn instructor_authors_and_student_takes_quiz() {
    let backend = InMemoryBackend::standalone().with_clock(fixed_clock());
    let api: Arc<dyn Backend> = Arc::new(backend.clone());

    backend.sign_in_as(Role::Instructor).unwrap();
    let module = api
        .create_module(&ModuleDraft {
            title: "Borrowing".into(),
            content: "# Borrowing\nRules.".into(),
            kind: ModuleKind::Text,
        })
        .await
        .unwrap();
    api.create_quiz(module.id, &quiz_draft(5)).await.unwrap();
    let key = api.answer_key(module.id).await.unwrap();
    assert_eq!(key.len(), 5);
    assert!(key.iter().all(|q| q.correct_choice().is_some()));

    backend.sign_in_as(Role::Student).unwrap();
    let quiz = api.fetch_quiz(module.id).await.unwrap();
    let answers: Vec<Answer> = quiz
        .questions()
        .iter()
        .zip(&key)
        .enumerate()
        .map(|(index, (question, keyed))| {
            let right = keyed.correct_choice().unwrap().id;
            let choice_id = if index == 4 {
                question.choices().iter().find(|c| c.id() != right).unwrap().id()
            } else {
                right
            };
            Answer {
                question_id: question.id(),
                choice_id,
            }
        })
        .collect();

    let result = api.submit_answers(module.id, &answers).await.unwrap();
    assert_eq!(result.total(), 5);
    assert_eq!(result.correct(), 4);
    assert!((result.score_percentage() - 80.0).abs() < f64::EPSILON);
    assert_eq!(backend.submissions().unwrap().len(), 1);
}

#[tokio::test]
async fn student_module_updates_are_forbidden() {
    let backend = InMemoryBackend::standalone();
    let module = backend
        .seed_module(ModuleDraft {
            title: "Intro".into(),
            content: "Hello".into(),
            kind: ModuleKind::Text,
        })
        .unwrap();
    backend.sign_in_as(Role::Student).unwrap();

    let patch = ModulePatch {
        title: Some("Renamed".into()),
        ..ModulePatch::default()
    };
    let err = backend.update_module(module.id, &patch).await.unwrap_err();
    assert!(matches!(err, api::ApiError::Forbidden(_)));
    assert!(backend.delete_module(module.id).await.is_err());
    assert_eq!(backend.get_module(module.id).await.unwrap().title, "Intro");
}

#[tokio::test]
async fn registration_login_and_profile_with_file_store() {
    let dir = std::env::temp_dir().join(format!("academy-api-it-{}", std::process::id()));
    let store = Arc::new(FileCredentialStore::new(dir.join("credentials.json")));
    let backend = InMemoryBackend::new(store.clone());

    let user = backend
        .register(&RegisterRequest {
            email: "grace@example.com".into(),
            password: "hopper".into(),
            username: Some("grace".into()),
            firstname: None,
            lastname: None,
            picture_profile: None,
        })
        .await
        .unwrap();
    assert_eq!(user.role, Role::Student);

    let token = backend
        .login(&LoginRequest::new("grace", "hopper").unwrap())
        .await
        .unwrap();
    store.save(&Credentials::new(token)).unwrap();

    let updated = backend
        .update_profile(&ProfilePatch {
            firstname: Some("Grace".into()),
            lastname: Some("Hopper".into()),
            ..ProfilePatch::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.display_name(), "Grace Hopper");

    let public = backend.user_profile(user.id).await.unwrap();
    assert_eq!(public.firstname.as_deref(), Some("Grace"));

    store.clear().unwrap();
    assert!(backend.current_user().await.unwrap_err().is_unauthorized());
    let _ = std::fs::remove_dir_all(dir);
}
