use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::use_auth_state;
use crate::routes::Route;
use crate::views::components::{CourseList, StatusIndicator};

#[component]
pub fn LandingView() -> Element {
    let auth_state = use_auth_state();
    let signed_in = auth_state.read().user().is_some();

    rsx! {
        div { class: "page landing",
            section { class: "hero",
                h1 { "Welcome to Academy" }
                p {
                    "Learn at your own pace with text and video modules, then check what "
                    "you have learned with short quizzes."
                }
                div { class: "hero-actions",
                    if signed_in {
                        Link { class: "btn btn-primary", to: Route::Dashboard {}, "Go to your dashboard" }
                    } else {
                        Link { class: "btn btn-primary", to: Route::Register {}, "Get started" }
                        Link { class: "btn", to: Route::Login {}, "Sign in" }
                    }
                }
                StatusIndicator {}
            }
            section { class: "features",
                article { class: "card",
                    h3 { "Multimedia content" }
                    p { "Modules are written lessons or videos, curated by instructors." }
                }
                article { class: "card",
                    h3 { "Roles" }
                    p { "Students learn, instructors author, administrators oversee the platform." }
                }
                article { class: "card",
                    h3 { "Quizzes" }
                    p { "Every module can end with a graded quiz and a full answer review." }
                }
            }
            CourseList {}
        }
    }
}
