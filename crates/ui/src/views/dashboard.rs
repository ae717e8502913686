use dioxus::prelude::*;
use dioxus_router::Link;

use academy_core::model::{Role, User};

use crate::context::{AppContext, use_auth_state};
use crate::routes::Route;
use crate::views::components::{CourseList, ErrorPanel, ProfileCard, StatTile, StatusIndicator};
use crate::views::guard::Protected;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ModuleCardVm, ModuleCounts, map_module_cards};

/// Modules fetched for an author dashboard.
const DASHBOARD_MODULE_LIMIT: u32 = 100;
const RECENT_MODULES: usize = 5;

#[component]
pub fn DashboardView() -> Element {
    rsx! {
        Protected { DashboardContent {} }
    }
}

#[component]
fn DashboardContent() -> Element {
    let auth_state = use_auth_state();
    let Some(user) = auth_state.read().user().cloned() else {
        return rsx! {};
    };
    let first_name = user
        .firstname
        .clone()
        .unwrap_or_else(|| user.display_name());
    let role = user.role;

    rsx! {
        div { class: "page dashboard",
            header { class: "page-header",
                h1 { "Welcome back, {first_name}" }
                p { class: "muted", "{role.label()} dashboard" }
            }
            match role {
                Role::Student => rsx! { StudentDashboard { user } },
                Role::Instructor => rsx! { AuthorDashboard { user } },
                Role::Admin => rsx! { AdminDashboard { user } },
            }
        }
    }
}

#[component]
fn StudentDashboard(user: User) -> Element {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();
    let modules = ctx.modules();
    let stats = use_resource(move || {
        let modules = modules.clone();
        let ctx = ctx.clone();
        async move {
            let result = modules.stats().await;
            ctx.sync_auth(auth_state);
            result.map_err(|err| ViewError::from(&err))
        }
    });
    let total = match view_state_from_resource(&stats) {
        ViewState::Ready(stats) => stats.total_modules.to_string(),
        _ => "--".to_owned(),
    };

    rsx! {
        div { class: "grid stats",
            StatTile { label: "Modules available", value: total }
        }
        div { class: "grid two",
            ProfileCard { user }
            section { class: "card",
                h2 { "System status" }
                StatusIndicator {}
            }
        }
        section { class: "card",
            h2 { "Quick actions" }
            div { class: "actions",
                Link { class: "btn btn-primary", to: Route::Modules {}, "Browse modules" }
            }
        }
        CourseList {}
    }
}

#[component]
fn AuthorDashboard(user: User) -> Element {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();
    let modules = ctx.modules();
    let resource = use_resource(move || {
        let modules = modules.clone();
        let ctx = ctx.clone();
        async move {
            let result = modules.list(Some(0), Some(DASHBOARD_MODULE_LIMIT)).await;
            ctx.sync_auth(auth_state);
            result.map_err(|err| ViewError::from(&err))
        }
    });
    let state = view_state_from_resource(&resource);
    let (counts, recent): (ModuleCounts, Vec<ModuleCardVm>) = match &state {
        ViewState::Ready(list) => {
            let mut cards = map_module_cards(list);
            cards.reverse();
            cards.truncate(RECENT_MODULES);
            (ModuleCounts::from_summaries(list), cards)
        }
        _ => (ModuleCounts::default(), Vec::new()),
    };

    rsx! {
        div { class: "grid stats",
            StatTile { label: "Modules", value: counts.total.to_string() }
            StatTile { label: "Video modules", value: counts.video.to_string() }
            StatTile { label: "Text modules", value: counts.text.to_string() }
        }
        div { class: "grid two",
            ProfileCard { user }
            section { class: "card",
                h2 { "System status" }
                StatusIndicator {}
            }
        }
        section { class: "card",
            h2 { "Quick actions" }
            div { class: "actions",
                Link { class: "btn btn-primary", to: Route::ModuleNew {}, "New module" }
                Link { class: "btn", to: Route::Modules {}, "All modules" }
            }
        }
        section { class: "card",
            h2 { "Recent modules" }
            match state {
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
                ViewState::Ready(_) if recent.is_empty() => rsx! {
                    p { class: "muted", "No modules yet." }
                    Link { class: "btn", to: Route::ModuleNew {}, "Create your first module" }
                },
                ViewState::Ready(_) => rsx! {
                    ul { class: "module-rows",
                        for card in recent {
                            li { key: "{card.id}",
                                span { class: "badge", "{card.kind_label}" }
                                span { class: "row-title", "{card.title}" }
                                span { class: "muted", "{card.created_label}" }
                                Link { to: Route::ModuleDetail { id: card.id.value() }, "View" }
                                Link { to: Route::ModuleEdit { id: card.id.value() }, "Edit" }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn AdminDashboard(user: User) -> Element {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();
    let modules = ctx.modules();
    let stats = use_resource(move || {
        let modules = modules.clone();
        let ctx = ctx.clone();
        async move {
            let result = modules.stats().await;
            ctx.sync_auth(auth_state);
            result.map_err(|err| ViewError::from(&err))
        }
    });
    let total = match view_state_from_resource(&stats) {
        ViewState::Ready(stats) => stats.total_modules.to_string(),
        _ => "--".to_owned(),
    };

    rsx! {
        div { class: "grid stats",
            StatTile { label: "Total modules", value: total }
        }
        div { class: "grid two",
            ProfileCard { user }
            section { class: "card",
                h2 { "System status" }
                StatusIndicator {}
            }
        }
        section { class: "card",
            h2 { "Quick actions" }
            div { class: "actions",
                Link { class: "btn btn-primary", to: Route::ModuleNew {}, "New module" }
                Link { class: "btn", to: Route::Modules {}, "Manage modules" }
            }
        }
    }
}
