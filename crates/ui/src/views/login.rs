use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use services::AuthState;

use crate::context::{AppContext, use_auth_state};
use crate::routes::Route;
use crate::vm::auth_error_message;

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();
    let navigator = use_navigator();

    let mut identifier = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut submitting = use_signal(|| false);

    let expired = *auth_state.read() == AuthState::Expired;

    use_effect(move || {
        if auth_state.read().user().is_some() {
            navigator.replace(Route::Dashboard {});
        }
    });

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if submitting() {
            return;
        }
        let ctx = ctx.clone();
        let login = identifier.peek().clone();
        let secret = password.peek().clone();
        spawn(async move {
            submitting.set(true);
            error.set(None);
            let result = ctx.auth().login(&login, &secret).await;
            submitting.set(false);
            match result {
                Ok(_) => {
                    ctx.sync_auth(auth_state);
                    navigator.push(Route::Dashboard {});
                }
                Err(err) => error.set(Some(auth_error_message(&err))),
            }
        });
    };

    rsx! {
        div { class: "page page-center",
            form { class: "card form auth-form", onsubmit: on_submit,
                h2 { "Sign in" }
                if expired {
                    p { class: "form-notice", "Your session has expired. Please sign in again." }
                }
                if let Some(message) = error() {
                    p { class: "form-error", role: "alert", "{message}" }
                }
                label { r#for: "login-identifier", "Email or username" }
                input {
                    id: "login-identifier",
                    r#type: "text",
                    autocomplete: "username",
                    value: "{identifier}",
                    oninput: move |evt| identifier.set(evt.value()),
                }
                label { r#for: "login-password", "Password" }
                input {
                    id: "login-password",
                    r#type: "password",
                    autocomplete: "current-password",
                    value: "{password}",
                    oninput: move |evt| password.set(evt.value()),
                }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Signing in..." } else { "Sign in" }
                }
                p { class: "muted",
                    "No account yet? "
                    Link { to: Route::Register {}, "Create one" }
                }
            }
        }
    }
}
