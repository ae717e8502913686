use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_navigator};
use tracing::warn;

use crate::context::{AppContext, use_auth_state};
use crate::views::{
    DashboardView, LandingView, LoginView, ModuleCreateView, ModuleDetailView, ModuleEditView,
    ModuleListView, NotFoundView, QuizView, RegisterView,
};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", LandingView)] Landing {},
        #[route("/login", LoginView)] Login {},
        #[route("/register", RegisterView)] Register {},
        #[route("/dashboard", DashboardView)] Dashboard {},
        #[route("/modules", ModuleListView)] Modules {},
        #[route("/modules/new", ModuleCreateView)] ModuleNew {},
        #[route("/modules/:id", ModuleDetailView)] ModuleDetail { id: u64 },
        #[route("/modules/:id/edit", ModuleEditView)] ModuleEdit { id: u64 },
        #[route("/modules/:id/quiz", QuizView)] ModuleQuiz { id: u64 },
        #[route("/:..segments", NotFoundView)] NotFound { segments: Vec<String> },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Header {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Header() -> Element {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();
    let navigator = use_navigator();
    let user = auth_state.read().user().cloned();

    let on_logout = move |_: MouseEvent| {
        if let Err(err) = ctx.auth().logout() {
            warn!(error = %err, "stored credentials could not be removed");
        }
        ctx.sync_auth(auth_state);
        navigator.push(Route::Landing {});
    };

    rsx! {
        header { class: "topbar",
            Link { class: "brand", to: Route::Landing {}, "Academy" }
            nav {
                if let Some(user) = user {
                    Link { to: Route::Dashboard {}, "Dashboard" }
                    Link { to: Route::Modules {}, "Modules" }
                    span { class: "topbar-user", "{user.display_name()} · {user.role.label()}" }
                    button { class: "btn btn-ghost", id: "logout", onclick: on_logout, "Sign out" }
                } else {
                    Link { to: Route::Login {}, "Sign in" }
                    Link { class: "btn btn-primary", to: Route::Register {}, "Create account" }
                }
            }
        }
    }
}
