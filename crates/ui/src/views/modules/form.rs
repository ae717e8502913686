use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use academy_core::model::{Module, ModuleId, ModuleKind};

use crate::context::{AppContext, use_auth_state};
use crate::routes::Route;
use crate::views::components::ErrorPanel;
use crate::views::guard::{AUTHOR_ROLES, Protected};
use crate::views::modules::quiz_editor::QuizEditorSection;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ModuleFormVm, excerpt, markdown_to_html};

const PREVIEW_CHARS: usize = 160;

/// Title, kind and body inputs bound to `form`.
#[component]
fn ModuleFields(form: Signal<ModuleFormVm>) -> Element {
    let mut form = form;
    let current = form.read().clone();
    let kind_value = match current.kind {
        ModuleKind::Text => "text",
        ModuleKind::Video => "video",
    };
    let preview = match current.kind {
        ModuleKind::Text if !current.content.trim().is_empty() => Some((
            excerpt(&current.content, PREVIEW_CHARS),
            markdown_to_html(&current.content),
        )),
        _ => None,
    };

    rsx! {
        label { r#for: "module-title", "Title" }
        input {
            id: "module-title",
            r#type: "text",
            value: "{current.title}",
            oninput: move |evt| form.write().title = evt.value(),
        }
        label { r#for: "module-kind", "Type" }
        select {
            id: "module-kind",
            value: "{kind_value}",
            onchange: move |evt| form.write().kind = ModuleFormVm::parse_kind(&evt.value()),
            option { value: "text", "Text" }
            option { value: "video", "Video" }
        }
        match current.kind {
            ModuleKind::Text => rsx! {
                label { r#for: "module-content", "Content (Markdown)" }
                textarea {
                    id: "module-content",
                    rows: "14",
                    value: "{current.content}",
                    oninput: move |evt| form.write().content = evt.value(),
                }
            },
            ModuleKind::Video => rsx! {
                label { r#for: "module-content", "Video URL" }
                input {
                    id: "module-content",
                    r#type: "url",
                    placeholder: "https://",
                    value: "{current.content}",
                    oninput: move |evt| form.write().content = evt.value(),
                }
            },
        }
        if let Some((summary, html)) = preview {
            section { class: "preview",
                h3 { "Preview" }
                p { class: "muted", "{summary}" }
                div { class: "markdown", dangerous_inner_html: "{html}" }
            }
        }
    }
}

#[component]
pub fn ModuleCreateView() -> Element {
    rsx! {
        Protected { roles: AUTHOR_ROLES.to_vec(), ModuleCreate {} }
    }
}

#[component]
fn ModuleCreate() -> Element {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();
    let navigator = use_navigator();
    let form = use_signal(ModuleFormVm::default);
    let mut saving = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if saving() {
            return;
        }
        let draft = form.peek().to_draft();
        let ctx = ctx.clone();
        spawn(async move {
            saving.set(true);
            error.set(None);
            let result = ctx.modules().create(draft).await;
            saving.set(false);
            ctx.sync_auth(auth_state);
            match result {
                Ok(module) => {
                    navigator.push(Route::ModuleEdit {
                        id: module.id.value(),
                    });
                }
                Err(err) => error.set(Some(err.to_string())),
            }
        });
    };

    rsx! {
        div { class: "page module-form",
            Link { class: "back-link", to: Route::Modules {}, "Back to modules" }
            form { class: "card form", onsubmit: on_submit,
                h1 { "New module" }
                if let Some(message) = error() {
                    p { class: "form-error", role: "alert", "{message}" }
                }
                ModuleFields { form }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: saving(),
                    if saving() { "Creating..." } else { "Create module" }
                }
            }
        }
    }
}

#[component]
pub fn ModuleEditView(id: u64) -> Element {
    rsx! {
        Protected { roles: AUTHOR_ROLES.to_vec(), ModuleEdit { id } }
    }
}

#[component]
fn ModuleEdit(id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();

    let resource = use_resource(use_reactive!(|id| {
        let modules = ctx.modules();
        let ctx = ctx.clone();
        async move {
            let result = modules.get(ModuleId::new(id)).await;
            ctx.sync_auth(auth_state);
            result.map_err(|err| ViewError::from(&err))
        }
    }));

    rsx! {
        div { class: "page module-form",
            Link { class: "back-link", to: Route::ModuleDetail { id }, "Back to module" }
            match view_state_from_resource(&resource) {
                ViewState::Idle | ViewState::Loading => rsx! { p { "Loading module..." } },
                ViewState::Error(error) => rsx! {
                    ErrorPanel {
                        error,
                        on_retry: move |()| {
                            let mut resource = resource;
                            resource.restart();
                        },
                    }
                },
                ViewState::Ready(module) => rsx! {
                    ModuleEditForm { key: "{module.id}", module: module.clone() }
                    QuizEditorSection { module_id: module.id, module_title: module.title.clone() }
                },
            }
        }
    }
}

#[component]
fn ModuleEditForm(module: Module) -> Element {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();
    let mut original = use_signal(|| module.clone());
    let form = use_signal(|| ModuleFormVm::from_module(&module));
    let mut saving = use_signal(|| false);
    let mut notice = use_signal(|| None::<Result<String, String>>);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if saving() {
            return;
        }
        let id = original.peek().id;
        let patch = form.peek().to_patch(&original.peek());
        let ctx = ctx.clone();
        spawn(async move {
            saving.set(true);
            notice.set(None);
            let result = ctx.modules().update(id, patch).await;
            saving.set(false);
            ctx.sync_auth(auth_state);
            match result {
                Ok(updated) => {
                    original.set(updated);
                    notice.set(Some(Ok("Module saved.".to_owned())));
                }
                Err(err) => notice.set(Some(Err(err.to_string()))),
            }
        });
    };

    rsx! {
        form { class: "card form", onsubmit: on_submit,
            h1 { "Edit module" }
            match notice() {
                Some(Ok(message)) => rsx! { p { class: "form-success", "{message}" } },
                Some(Err(message)) => rsx! { p { class: "form-error", role: "alert", "{message}" } },
                None => rsx! {},
            }
            ModuleFields { form }
            button {
                class: "btn btn-primary",
                r#type: "submit",
                disabled: saving(),
                if saving() { "Saving..." } else { "Save changes" }
            }
        }
    }
}
