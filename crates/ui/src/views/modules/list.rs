use dioxus::prelude::*;
use dioxus_router::Link;

use services::{DEFAULT_LIMIT, DEFAULT_SKIP};

use crate::context::{AppContext, use_auth_state};
use crate::routes::Route;
use crate::views::components::ErrorPanel;
use crate::views::guard::Protected;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{PageVm, map_module_cards};

#[component]
pub fn ModuleListView() -> Element {
    rsx! {
        Protected { ModuleList {} }
    }
}

#[component]
fn ModuleList() -> Element {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();
    let mut skip = use_signal(|| DEFAULT_SKIP);
    let can_author = auth_state
        .read()
        .user()
        .is_some_and(|user| user.role.can_author());

    let modules = ctx.modules();
    let resource = use_resource(move || {
        let modules = modules.clone();
        let ctx = ctx.clone();
        let offset = skip();
        async move {
            let result = modules.list(Some(offset), Some(DEFAULT_LIMIT)).await;
            ctx.sync_auth(auth_state);
            result.map_err(|err| ViewError::from(&err))
        }
    });

    rsx! {
        div { class: "page modules",
            header { class: "page-header",
                h1 { "Learning modules" }
                if can_author {
                    Link { class: "btn btn-primary", to: Route::ModuleNew {}, "New module" }
                }
            }
            match view_state_from_resource(&resource) {
                ViewState::Idle | ViewState::Loading => rsx! { p { "Loading modules..." } },
                ViewState::Error(error) => rsx! {
                    ErrorPanel {
                        error,
                        on_retry: move |()| {
                            let mut resource = resource;
                            resource.restart();
                        },
                    }
                },
                ViewState::Ready(list) => {
                    let page = PageVm::new(skip(), DEFAULT_LIMIT, list.len());
                    let cards = map_module_cards(&list);
                    rsx! {
                        if cards.is_empty() {
                            p { class: "muted", "No modules available." }
                        }
                        div { class: "grid",
                            for card in cards {
                                article { key: "{card.id}", class: "card module-card",
                                    span { class: "badge", "{card.kind_label}" }
                                    h3 {
                                        Link { to: Route::ModuleDetail { id: card.id.value() }, "{card.title}" }
                                    }
                                    p { class: "muted", "{card.created_label}" }
                                    if can_author {
                                        Link { class: "btn btn-ghost", to: Route::ModuleEdit { id: card.id.value() }, "Edit" }
                                    }
                                }
                            }
                        }
                        nav { class: "pager",
                            button {
                                class: "btn",
                                disabled: !page.has_previous(),
                                onclick: move |_| skip.set(page.previous_skip()),
                                "Previous"
                            }
                            span { class: "muted", "{page.label()}" }
                            button {
                                class: "btn",
                                disabled: !page.has_next(),
                                onclick: move |_| skip.set(page.next_skip()),
                                "Next"
                            }
                        }
                    }
                }
            }
        }
    }
}
