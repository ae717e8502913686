use std::time::Duration;

use dioxus::prelude::*;
use dioxus_router::Link;
use tracing::{debug, warn};

use academy_core::model::{ChoiceId, ModuleId, QuestionId};
use api::ApiError;
use services::{AuthState, QuizPhase, QuizSession, QuizSessionError};

use crate::context::{AppContext, use_auth_state};
use crate::routes::Route;
use crate::views::guard::Protected;
use crate::vm::{
    QuestionVm, QuizHeaderVm, QuizResultVm, navigator_class, session_error_message, submit_label,
};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[component]
pub fn QuizView(id: u64) -> Element {
    rsx! {
        Protected { QuizScreen { key: "{id}", id } }
    }
}

/// Expire the session when the quiz API rejected the session token.
fn absorb_expired_session(
    ctx: &AppContext,
    auth_state: Signal<AuthState>,
    error: Option<&QuizSessionError>,
) {
    if error.is_some_and(QuizSessionError::is_unauthorized) {
        if let Err(err) = ctx.auth().absorb(ApiError::Unauthorized) {
            warn!(error = %err, "expired session could not be fully cleared");
        }
        ctx.sync_auth(auth_state);
    }
}

fn start_load(ctx: AppContext, mut session: Signal<QuizSession>, auth_state: Signal<AuthState>) {
    spawn(async move {
        let service = ctx.quiz_sessions();
        let (ticket, module_id) = {
            let mut current = session.write();
            (current.begin_load(), current.module_id())
        };
        let outcome = service.fetch_quiz(module_id).await;
        if let Err(err) = &outcome {
            warn!(%module_id, error = %err, "quiz load failed");
        }
        let now = service.now();
        let completion = session.write().complete_load(ticket, outcome, now);
        debug!(%module_id, ?completion, "quiz load finished");
        absorb_expired_session(&ctx, auth_state, session.peek().error());
    });
}

/// User actions on the quiz screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum QuizIntent {
    Select {
        question: QuestionId,
        choice: ChoiceId,
    },
    GoTo(usize),
    Next,
    Previous,
    Submit,
    Retry,
    Reload,
}

/// Session state of one quiz screen plus the intent dispatcher driving it.
#[derive(Clone, Copy)]
pub(crate) struct QuizController {
    pub session: Signal<QuizSession>,
    pub notice: Signal<Option<String>>,
    pub dispatch: Callback<QuizIntent>,
}

fn submit_answers(
    ctx: &AppContext,
    mut session: Signal<QuizSession>,
    mut notice: Signal<Option<String>>,
    auth_state: Signal<AuthState>,
) {
    let service = ctx.quiz_sessions();
    let begun = {
        let mut current = session.write();
        current.clear_error();
        current.begin_submit(service.now())
    };
    let (ticket, answers) = match begun {
        Ok(begun) => begun,
        Err(err) => {
            notice.set(Some(session_error_message(&err)));
            return;
        }
    };
    notice.set(None);
    let ctx = ctx.clone();
    spawn(async move {
        let module_id = session.peek().module_id();
        let outcome = service.send_answers(module_id, &answers).await;
        if let Err(err) = &outcome {
            warn!(%module_id, error = %err, "quiz submission failed");
        }
        let completion = session.write().complete_submit(ticket, outcome);
        debug!(%module_id, ?completion, "quiz submission finished");
        absorb_expired_session(&ctx, auth_state, session.peek().error());
    });
}

/// Load the quiz for module `id`, keep its timer running and detach the
/// session when the screen goes away.
pub(crate) fn use_quiz_controller(id: u64) -> QuizController {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();
    let mut session = use_signal(|| QuizSession::new(ModuleId::new(id)));
    let mut notice = use_signal(|| None::<String>);

    let load_ctx = ctx.clone();
    use_hook(move || start_load(load_ctx, session, auth_state));

    let tick_ctx = ctx.clone();
    use_future(move || {
        let service = tick_ctx.quiz_sessions();
        async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;
                if session.peek().phase() == QuizPhase::Active {
                    let now = service.now();
                    let _ = session.write().tick(now);
                }
            }
        }
    });

    use_drop(move || {
        if let Ok(mut current) = session.try_write() {
            current.detach();
        }
    });

    let dispatch = use_callback(move |intent: QuizIntent| {
        let moved = match intent {
            QuizIntent::Select { question, choice } => {
                notice.set(None);
                session.write().select_answer(question, choice)
            }
            QuizIntent::GoTo(index) => session.write().go_to_question(index),
            QuizIntent::Next => session.write().next(),
            QuizIntent::Previous => session.write().previous(),
            QuizIntent::Submit => {
                submit_answers(&ctx, session, notice, auth_state);
                Ok(())
            }
            QuizIntent::Retry => {
                notice.set(None);
                let now = ctx.quiz_sessions().now();
                session.write().retry(now)
            }
            QuizIntent::Reload => {
                start_load(ctx.clone(), session, auth_state);
                Ok(())
            }
        };
        if let Err(err) = moved {
            warn!(?intent, error = %err, "quiz action rejected");
        }
    });

    QuizController {
        session,
        notice,
        dispatch,
    }
}

#[component]
fn QuizScreen(id: u64) -> Element {
    let quiz = use_quiz_controller(id);
    quiz_page(id, quiz)
}

/// Screen for the current phase of `quiz`.
pub(crate) fn quiz_page(id: u64, quiz: QuizController) -> Element {
    let QuizController {
        session,
        notice,
        dispatch,
    } = quiz;
    let current = session.read().clone();
    let back = Route::ModuleDetail { id };

    match current.phase() {
        QuizPhase::Loading => rsx! {
            div { class: "page page-center",
                div { class: "spinner" }
                p { "Loading quiz..." }
            }
        },
        QuizPhase::LoadFailed => {
            let message = current
                .error()
                .map(session_error_message)
                .unwrap_or_else(|| "The quiz could not be loaded.".to_owned());
            let missing = matches!(
                current.error(),
                Some(QuizSessionError::NoQuiz | QuizSessionError::ModuleNotFound)
            );
            rsx! {
                div { class: "page page-center",
                    div { class: "error-panel", role: "alert",
                        p { "{message}" }
                        if !missing {
                            button {
                                class: "btn",
                                onclick: move |_| dispatch.call(QuizIntent::Reload),
                                "Retry"
                            }
                        }
                        Link { class: "btn btn-ghost", to: back, "Back to module" }
                    }
                }
            }
        }
        QuizPhase::Reviewing => {
            let Some(result) = current.result() else {
                return rsx! {};
            };
            let vm = QuizResultVm::new(result, current.quiz(), current.time_spent_seconds());
            rsx! {
                QuizResults {
                    vm,
                    back,
                    on_retry: move |()| dispatch.call(QuizIntent::Retry),
                }
            }
        }
        QuizPhase::Active | QuizPhase::Submitting => {
            let header = QuizHeaderVm::from_session(&current);
            let question = QuestionVm::current(&current);
            let dots = current.navigator();
            let submitting = current.phase() == QuizPhase::Submitting;
            let error = notice().or_else(|| current.error().map(session_error_message));
            let is_first = current.is_first();
            let is_last = current.is_last();

            rsx! {
                div { class: "page quiz",
                    header { class: "quiz-header",
                        h1 { "{header.title}" }
                        div { class: "quiz-meta",
                            span { "{header.position_label}" }
                            span { "{header.answered_label}" }
                            span { class: "timer", "{header.elapsed}" }
                        }
                        div { class: "progress",
                            div { class: "progress-fill", style: "{header.bar_style()}" }
                        }
                    }
                    nav { class: "quiz-navigator",
                        for dot in dots {
                            button {
                                key: "{dot.question_id}",
                                class: navigator_class(&dot),
                                disabled: submitting,
                                onclick: move |_| dispatch.call(QuizIntent::GoTo(dot.index)),
                                "{dot.index + 1}"
                            }
                        }
                    }
                    if let Some(question) = question {
                        section { class: "card question",
                            h2 { "{question.question.text()}" }
                            ul { class: "choices",
                                for choice in question.choices {
                                    li { key: "{choice.id}",
                                        button {
                                            class: if choice.selected { "choice choice--selected" } else { "choice" },
                                            disabled: submitting,
                                            onclick: {
                                                let intent = QuizIntent::Select {
                                                    question: question.question.id(),
                                                    choice: choice.id,
                                                };
                                                move |_| dispatch.call(intent)
                                            },
                                            "{choice.text}"
                                        }
                                    }
                                }
                            }
                        }
                    }
                    if let Some(message) = error {
                        p { class: "form-error", role: "alert", "{message}" }
                    }
                    div { class: "quiz-actions",
                        button {
                            class: "btn",
                            disabled: is_first || submitting,
                            onclick: move |_| dispatch.call(QuizIntent::Previous),
                            "Previous"
                        }
                        if is_last {
                            button {
                                class: "btn btn-primary",
                                id: "submit-quiz",
                                disabled: submitting,
                                onclick: move |_| dispatch.call(QuizIntent::Submit),
                                "{submit_label(current.phase())}"
                            }
                        } else {
                            button {
                                class: "btn btn-primary",
                                disabled: submitting,
                                onclick: move |_| dispatch.call(QuizIntent::Next),
                                "Next"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn QuizResults(vm: QuizResultVm, back: Route, on_retry: EventHandler<()>) -> Element {
    rsx! {
        div { class: "page quiz-results",
            section { class: "card results-summary",
                h1 { "Quiz results" }
                p { class: vm.tone.class(), "{vm.score_label}" }
                p { class: "band", "{vm.band.message()}" }
                div { class: "grid stats",
                    div { class: "stat",
                        p { class: "stat-label", "Correct" }
                        p { class: "stat-value", "{vm.correct} / {vm.total}" }
                    }
                    div { class: "stat",
                        p { class: "stat-label", "Incorrect" }
                        p { class: "stat-value", "{vm.incorrect}" }
                    }
                    div { class: "stat",
                        p { class: "stat-label", "Time" }
                        p { class: "stat-value", "{vm.time_label}" }
                    }
                }
                div { class: "actions",
                    button { class: "btn btn-primary", id: "retry-quiz", onclick: move |_| on_retry.call(()), "Try again" }
                    Link { class: "btn", to: back, "Back to module" }
                }
            }
            section { class: "review",
                h2 { "Review" }
                for (index, item) in vm.items.iter().enumerate() {
                    article {
                        key: "{index}",
                        class: if item.is_correct { "card review-item review-item--right" } else { "card review-item review-item--wrong" },
                        h3 { "{index + 1}. {item.question_text}" }
                        if item.choices.is_empty() {
                            p { "Your answer: {item.your_answer}" }
                            if !item.is_correct {
                                p { "Correct answer: {item.correct_answer}" }
                            }
                        } else {
                            ul { class: "choices",
                                for choice in item.choices.iter() {
                                    li { class: choice.class, "{choice.text}" }
                                }
                            }
                            if !item.answered {
                                p { class: "muted", "Not answered" }
                            }
                        }
                    }
                }
            }
        }
    }
}
