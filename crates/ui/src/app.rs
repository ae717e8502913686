use dioxus::prelude::*;
use dioxus_router::Router;
use tracing::warn;

use services::AuthState;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn App() -> Element {
    let ctx = use_context::<AppContext>();
    let initial = ctx.auth().state().unwrap_or(AuthState::Initializing);
    let mut auth_state = use_context_provider(|| Signal::new(initial));

    // Restore a persisted session once; the guard shows a spinner meanwhile.
    use_future(move || {
        let ctx = ctx.clone();
        async move {
            if *auth_state.peek() != AuthState::Initializing {
                return;
            }
            match ctx.auth().init().await {
                Ok(state) => auth_state.set(state),
                Err(err) => {
                    warn!(error = %err, "could not restore session");
                    auth_state.set(AuthState::SignedOut);
                }
            }
        }
    });

    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }

        document::Title { "Academy" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{errors:?}" }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
