use dioxus::prelude::*;
use dioxus_router::use_navigator;

use academy_core::model::Role;
use services::{GuardDecision, guard};

use crate::context::use_auth_state;
use crate::routes::Route;

/// Roles allowed to author modules and quizzes.
pub const AUTHOR_ROLES: [Role; 2] = [Role::Instructor, Role::Admin];

/// Renders `children` only for signed-in users holding one of `roles`
/// (any role when empty); redirects everyone else.
#[component]
pub fn Protected(#[props(default)] roles: Vec<Role>, children: Element) -> Element {
    let auth_state = use_auth_state();
    let navigator = use_navigator();
    let decision = guard(&auth_state.read(), &roles);

    use_effect(use_reactive!(|decision| {
        match decision {
            GuardDecision::RedirectLanding => {
                navigator.replace(Route::Landing {});
            }
            GuardDecision::RedirectLogin => {
                navigator.replace(Route::Login {});
            }
            GuardDecision::RedirectDashboard => {
                navigator.replace(Route::Dashboard {});
            }
            GuardDecision::Pending | GuardDecision::Allow => {}
        }
    }));

    match decision {
        GuardDecision::Pending => rsx! {
            div { class: "page page-center",
                div { class: "spinner" }
                p { "Loading..." }
            }
        },
        GuardDecision::Allow => rsx! { {children} },
        GuardDecision::RedirectLanding
        | GuardDecision::RedirectLogin
        | GuardDecision::RedirectDashboard => rsx! {
            div { class: "page page-center",
                p { "Redirecting..." }
            }
        },
    }
}
