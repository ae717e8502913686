use dioxus::prelude::*;
use tracing::debug;

use academy_core::model::ModuleId;
use api::ApiError;
use services::QuizAuthoringError;

use crate::context::{AppContext, use_auth_state};
use crate::views::components::ErrorPanel;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::QuizEditorVm;

/// Loads the module's answer key, or a blank editor when it has no quiz.
#[component]
pub fn QuizEditorSection(module_id: ModuleId, module_title: String) -> Element {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();

    let resource = use_resource(use_reactive!(|module_id, module_title| {
        let ctx = ctx.clone();
        async move {
            let default_title = format!("{module_title} quiz");
            let key = ctx.quiz_authoring().answer_key(module_id).await;
            ctx.sync_auth(auth_state);
            match key {
                Ok(key) => {
                    let title = ctx
                        .quiz_sessions()
                        .fetch_quiz(module_id)
                        .await
                        .map_or(default_title, |quiz| quiz.title().to_owned());
                    Ok(QuizEditorVm::from_key(title, &key))
                }
                Err(QuizAuthoringError::Api(ApiError::NotFound(_))) => {
                    debug!(%module_id, "module has no quiz yet");
                    Ok(QuizEditorVm::new(default_title))
                }
                Err(err) => Err(ViewError::from(&err)),
            }
        }
    }));

    rsx! {
        section { class: "card quiz-editor",
            h2 { "Quiz" }
            match view_state_from_resource(&resource) {
                ViewState::Idle | ViewState::Loading => rsx! { p { "Loading quiz..." } },
                ViewState::Error(error) => rsx! {
                    ErrorPanel {
                        error,
                        on_retry: move |()| {
                            let mut resource = resource;
                            resource.restart();
                        },
                    }
                },
                ViewState::Ready(editor) => rsx! { QuizEditorForm { module_id, initial: editor } },
            }
        }
    }
}

#[component]
fn QuizEditorForm(module_id: ModuleId, initial: QuizEditorVm) -> Element {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();
    let mut editor = use_signal(|| initial);
    let mut busy = use_signal(|| false);
    let mut notice = use_signal(|| None::<Result<String, Vec<String>>>);

    let save_ctx = ctx.clone();
    let on_save = move |_: MouseEvent| {
        if busy() {
            return;
        }
        let draft = editor.peek().to_draft();
        let existing = editor.peek().is_existing();
        let ctx = save_ctx.clone();
        spawn(async move {
            busy.set(true);
            notice.set(None);
            let authoring = ctx.quiz_authoring();
            let result = if existing {
                authoring.update_quiz(module_id, &draft).await
            } else {
                authoring.create_quiz(module_id, &draft).await
            };
            busy.set(false);
            ctx.sync_auth(auth_state);
            match result {
                Ok(_) => {
                    editor.write().mark_saved();
                    notice.set(Some(Ok("Quiz saved.".to_owned())));
                }
                Err(QuizAuthoringError::Draft(err)) => {
                    let issues = err.issues().iter().map(ToString::to_string).collect();
                    notice.set(Some(Err(issues)));
                }
                Err(err) => notice.set(Some(Err(vec![err.to_string()]))),
            }
        });
    };

    let on_delete = move |_: MouseEvent| {
        if busy() {
            return;
        }
        let ctx = ctx.clone();
        spawn(async move {
            busy.set(true);
            notice.set(None);
            let result = ctx.quiz_authoring().delete_quiz(module_id).await;
            busy.set(false);
            ctx.sync_auth(auth_state);
            match result {
                Ok(()) => {
                    let title = editor.peek().title().to_owned();
                    editor.set(QuizEditorVm::new(title));
                    notice.set(Some(Ok("Quiz deleted.".to_owned())));
                }
                Err(err) => notice.set(Some(Err(vec![err.to_string()]))),
            }
        });
    };

    let current = editor.read().clone();

    rsx! {
        match notice() {
            Some(Ok(message)) => rsx! { p { class: "form-success", "{message}" } },
            Some(Err(messages)) => rsx! {
                ul { class: "form-error", role: "alert",
                    for message in messages {
                        li { "{message}" }
                    }
                }
            },
            None => rsx! {},
        }
        label { r#for: "quiz-title", "Quiz title" }
        input {
            id: "quiz-title",
            r#type: "text",
            value: "{current.title()}",
            oninput: move |evt| editor.write().set_title(evt.value()),
        }
        for (q_index, question) in current.questions().iter().cloned().enumerate() {
            fieldset { key: "{q_index}", class: "quiz-question",
                legend { "Question {q_index + 1}" }
                textarea {
                    rows: "2",
                    value: "{question.text}",
                    oninput: move |evt| editor.write().set_question_text(q_index, evt.value()),
                }
                ul { class: "quiz-choices",
                    for (c_index, choice) in question.choices.iter().cloned().enumerate() {
                        li { key: "{c_index}",
                            input {
                                r#type: "radio",
                                name: "correct-{q_index}",
                                checked: choice.is_correct,
                                title: "Correct answer",
                                onchange: move |_| editor.write().set_correct(q_index, c_index),
                            }
                            input {
                                r#type: "text",
                                value: "{choice.text}",
                                placeholder: "Choice {c_index + 1}",
                                oninput: move |evt| {
                                    editor.write().set_choice_text(q_index, c_index, evt.value());
                                },
                            }
                            button {
                                class: "btn btn-ghost",
                                r#type: "button",
                                onclick: move |_| editor.write().remove_choice(q_index, c_index),
                                "Remove"
                            }
                        }
                    }
                }
                div { class: "actions",
                    button {
                        class: "btn",
                        r#type: "button",
                        onclick: move |_| editor.write().add_choice(q_index),
                        "Add choice"
                    }
                    button {
                        class: "btn btn-ghost",
                        r#type: "button",
                        onclick: move |_| editor.write().remove_question(q_index),
                        "Remove question"
                    }
                }
            }
        }
        div { class: "actions",
            button {
                class: "btn",
                r#type: "button",
                onclick: move |_| editor.write().add_question(),
                "Add question"
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                disabled: busy(),
                onclick: on_save,
                if current.is_existing() { "Save quiz" } else { "Create quiz" }
            }
            if current.is_existing() {
                button {
                    class: "btn btn-danger",
                    r#type: "button",
                    disabled: busy(),
                    onclick: on_delete,
                    "Delete quiz"
                }
            }
        }
    }
}
