use academy_core::model::{ModuleDraft, ModuleKind, Quiz, Role};
use api::QuizApi;

use super::quiz::QuizIntent;

use super::test_harness::{
    ViewKind, backend, seed_quiz, seed_text_module, setup_view_harness,
};

#[tokio::test(flavor = "current_thread")]
async fn landing_view_smoke_renders_hero_and_catalog() {
    let mut harness = setup_view_harness(ViewKind::Landing, backend(), None).await;
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Welcome to Academy"), "missing hero in {html}");
    assert!(html.contains("Server online"), "missing status in {html}");
    assert!(html.contains("Available courses"), "missing courses in {html}");
    assert!(html.contains("Get started"), "missing sign-up link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn student_dashboard_smoke_renders_module_total() {
    let backend = backend();
    seed_text_module(&backend, "Ownership");
    seed_text_module(&backend, "Borrowing");

    let mut harness = setup_view_harness(ViewKind::Dashboard, backend, Some(Role::Student)).await;
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Student dashboard"), "missing role header in {html}");
    assert!(html.contains("Modules available"), "missing stat in {html}");
    assert!(html.contains(">2<"), "missing module total in {html}");
    assert!(!html.contains("New module"), "students cannot author: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn instructor_dashboard_smoke_counts_modules_by_kind() {
    let backend = backend();
    seed_text_module(&backend, "Ownership");
    backend
        .seed_module(ModuleDraft {
            title: "Lifetimes on video".into(),
            content: "https://videos.example.com/lifetimes".into(),
            kind: ModuleKind::Video,
        })
        .expect("seed video module");

    let mut harness =
        setup_view_harness(ViewKind::Dashboard, backend, Some(Role::Instructor)).await;
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Video modules"), "missing video stat in {html}");
    assert!(html.contains("Recent modules"), "missing recent list in {html}");
    assert!(html.contains("Lifetimes on video"), "missing module row in {html}");
    assert!(html.contains("New module"), "missing author action in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn module_list_smoke_pages_through_modules() {
    let backend = backend();
    for n in 1..=12 {
        seed_text_module(&backend, &format!("Chapter {n}"));
    }

    let mut harness = setup_view_harness(ViewKind::Modules, backend, Some(Role::Student)).await;
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Modules 1-10"), "missing page label in {html}");
    assert!(html.contains("Chapter 10"), "missing last row of page in {html}");
    assert!(!html.contains("Chapter 11"), "second page leaked into first: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn module_detail_smoke_renders_markdown_and_quiz_link() {
    let backend = backend();
    let module = seed_text_module(&backend, "Traits");

    let mut harness = setup_view_harness(
        ViewKind::ModuleDetail(module.id.value()),
        backend,
        Some(Role::Student),
    )
    .await;
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("<h2>Traits</h2>"), "missing rendered markdown in {html}");
    assert!(html.contains("Take the quiz"), "missing quiz link in {html}");
    assert!(!html.contains("Delete"), "students cannot delete: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_starts_on_first_question() {
    let backend = backend();
    let module = seed_text_module(&backend, "Iterators");
    seed_quiz(&backend, &module, 2);

    let mut harness = setup_view_harness(
        ViewKind::Quiz(module.id.value()),
        backend,
        Some(Role::Student),
    )
    .await;
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Iterators quiz"), "missing quiz title in {html}");
    assert!(html.contains("Question 1 of 2"), "missing position in {html}");
    assert!(html.contains("0 / 2 answered"), "missing answered count in {html}");
    assert!(html.contains("Question 1?"), "missing question text in {html}");
    assert!(html.contains("0:00"), "missing timer in {html}");
}

fn pick(quiz: &Quiz, index: usize, text: &str) -> QuizIntent {
    let question = &quiz.questions()[index];
    let choice = question
        .choices()
        .iter()
        .find(|choice| choice.text() == text)
        .expect("choice exists");
    QuizIntent::Select {
        question: question.id(),
        choice: choice.id(),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_submits_and_reviews_answers() {
    let backend = backend();
    let module = seed_text_module(&backend, "Lifetimes");
    seed_quiz(&backend, &module, 3);

    let mut harness = setup_view_harness(
        ViewKind::QuizIntents(module.id.value()),
        backend,
        Some(Role::Student),
    )
    .await;
    harness.rebuild();
    harness.settle().await;
    let quiz = harness
        .backend
        .fetch_quiz(module.id)
        .await
        .expect("fetch quiz");

    harness.dispatch_quiz(pick(&quiz, 0, "Yes")).await;
    harness.dispatch_quiz(QuizIntent::Next).await;
    harness.dispatch_quiz(pick(&quiz, 1, "No")).await;
    harness.dispatch_quiz(QuizIntent::GoTo(2)).await;

    let html = harness.render();
    assert!(html.contains("2 / 3 answered"), "missing answered count in {html}");
    assert!(html.contains("submit-quiz"), "last question offers submit: {html}");

    harness.dispatch_quiz(QuizIntent::Submit).await;

    let html = harness.render();
    assert!(html.contains("Quiz results"), "missing results in {html}");
    assert!(html.contains("33.33%"), "missing score label in {html}");
    assert!(html.contains("choice choice--right"), "missing right pick in {html}");
    assert!(html.contains("choice choice--wrong"), "missing wrong pick in {html}");
    assert!(html.contains("choice choice--answer"), "correct answer hidden in {html}");
    assert!(html.contains("Not answered"), "missing unanswered note in {html}");
    assert!(html.contains("retry-quiz"), "missing retry in {html}");

    harness.dispatch_quiz(QuizIntent::Retry).await;
    let html = harness.render();
    assert!(html.contains("0 / 3 answered"), "retry keeps old answers: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_reports_module_without_quiz() {
    let backend = backend();
    let module = seed_text_module(&backend, "Macros");

    let mut harness = setup_view_harness(
        ViewKind::Quiz(module.id.value()),
        backend,
        Some(Role::Student),
    )
    .await;
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("this module has no quiz yet"), "missing notice in {html}");
    assert!(!html.contains(">Retry<"), "no retry for a missing quiz: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn protected_view_smoke_redirects_signed_out_users() {
    let mut harness = setup_view_harness(ViewKind::Dashboard, backend(), None).await;
    harness.rebuild();

    let html = harness.render();
    assert!(html.contains("Redirecting..."), "expected redirect in {html}");
    assert!(!html.contains("Welcome back"), "dashboard leaked in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn module_edit_smoke_rejects_students() {
    let backend = backend();
    let module = seed_text_module(&backend, "Closures");

    let mut harness = setup_view_harness(
        ViewKind::ModuleEdit(module.id.value()),
        backend,
        Some(Role::Student),
    )
    .await;
    harness.rebuild();

    let html = harness.render();
    assert!(html.contains("Redirecting..."), "expected redirect in {html}");
    assert!(!html.contains("Edit module"), "editor leaked in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn module_edit_smoke_loads_existing_quiz_for_authors() {
    let backend = backend();
    let module = seed_text_module(&backend, "Generics");
    seed_quiz(&backend, &module, 1);

    let mut harness = setup_view_harness(
        ViewKind::ModuleEdit(module.id.value()),
        backend,
        Some(Role::Instructor),
    )
    .await;
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Edit module"), "missing form in {html}");
    assert!(html.contains("Generics quiz"), "missing quiz title in {html}");
    assert!(html.contains("Save quiz"), "existing quiz should be replaced: {html}");
    assert!(html.contains("Delete quiz"), "missing delete action in {html}");
}
