use dioxus::prelude::*;
use dioxus_router::Link;

use crate::routes::Route;

#[component]
pub fn NotFoundView(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div { class: "page page-center",
            h2 { "Page not found" }
            p { class: "muted", "Nothing lives at /{path}." }
            Link { class: "btn", to: Route::Landing {}, "Back to home" }
        }
    }
}
