use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use academy_core::model::{Module, ModuleId};

use crate::context::{AppContext, use_auth_state};
use crate::routes::Route;
use crate::views::components::ErrorPanel;
use crate::views::guard::Protected;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ModuleContentVm, format_date};

#[component]
pub fn ModuleDetailView(id: u64) -> Element {
    rsx! {
        Protected { ModuleDetail { id } }
    }
}

#[component]
fn ModuleDetail(id: u64) -> Element {
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
        div { class: "page module-detail",
            Link { class: "back-link", to: Route::Modules {}, "Back to modules" }
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
                ViewState::Ready(module) => rsx! { ModuleBody { module } },
            }
        }
    }
}

#[component]
fn ModuleBody(module: Module) -> Element {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();
    let navigator = use_navigator();
    let mut confirming = use_signal(|| false);
    let mut deleting = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);

    let can_author = auth_state
        .read()
        .user()
        .is_some_and(|user| user.role.can_author());
    let id = module.id;
    let content = ModuleContentVm::from_module(&module);
    let created = format_date(module.created_at);
    let updated = module.updated_at.map(format_date);

    let on_delete = move |_: MouseEvent| {
        if deleting() {
            return;
        }
        let ctx = ctx.clone();
        spawn(async move {
            deleting.set(true);
            let result = ctx.modules().delete(id).await;
            deleting.set(false);
            ctx.sync_auth(auth_state);
            match result {
                Ok(()) => {
                    navigator.push(Route::Modules {});
                }
                Err(err) => {
                    confirming.set(false);
                    error.set(Some(err.to_string()));
                }
            }
        });
    };

    rsx! {
        article { class: "card module",
            header { class: "module-header",
                span { class: "badge", "{module.kind.label()}" }
                h1 { "{module.title}" }
                p { class: "muted",
                    "Added {created}"
                    if let Some(updated) = updated {
                        " · Updated {updated}"
                    }
                }
            }
            match content {
                ModuleContentVm::Html(html) => rsx! {
                    div { class: "markdown", dangerous_inner_html: "{html}" }
                },
                ModuleContentVm::Video { url } => rsx! {
                    div { class: "video",
                        p { "This module is a video lesson." }
                        a { class: "btn", href: "{url}", target: "_blank", "Watch the video" }
                    }
                },
            }
        }
        if let Some(message) = error() {
            p { class: "form-error", role: "alert", "{message}" }
        }
        div { class: "actions",
            Link { class: "btn btn-primary", to: Route::ModuleQuiz { id: id.value() }, "Take the quiz" }
            if can_author {
                Link { class: "btn", to: Route::ModuleEdit { id: id.value() }, "Edit" }
                if confirming() {
                    span { class: "confirm",
                        "Delete this module? "
                        button {
                            class: "btn btn-danger",
                            id: "confirm-delete",
                            disabled: deleting(),
                            onclick: on_delete,
                            if deleting() { "Deleting..." } else { "Delete" }
                        }
                        button { class: "btn btn-ghost", onclick: move |_| confirming.set(false), "Cancel" }
                    }
                } else {
                    button { class: "btn btn-danger", onclick: move |_| confirming.set(true), "Delete" }
                }
            }
        }
    }
}
