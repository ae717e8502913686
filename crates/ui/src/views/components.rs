use dioxus::prelude::*;

use academy_core::model::{Course, CourseLevel, User};

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::ProfileVm;

#[component]
pub fn ErrorPanel(error: ViewError, on_retry: Option<EventHandler<()>>) -> Element {
    rsx! {
        div { class: "error-panel", role: "alert",
            p { "{error.message()}" }
            if let Some(on_retry) = on_retry {
                button { class: "btn", onclick: move |_| on_retry.call(()), "Retry" }
            }
        }
    }
}

/// Backend liveness badge.
#[component]
pub fn StatusIndicator() -> Element {
    let ctx = use_context::<AppContext>();
    let catalog = ctx.catalog();
    let health = use_resource(move || {
        let catalog = catalog.clone();
        async move { catalog.is_reachable().await }
    });
    let reachable = *health.read();

    rsx! {
        div { class: "status",
            match reachable {
                None => rsx! { span { class: "status-indicator", "Checking server..." } },
                Some(true) => rsx! { span { class: "status-indicator status-success", "Server online" } },
                Some(false) => rsx! { span { class: "status-indicator status-error", "Server unavailable" } },
            }
        }
    }
}

fn level_label(level: CourseLevel) -> &'static str {
    match level {
        CourseLevel::Beginner => "Beginner",
        CourseLevel::Intermediate => "Intermediate",
        CourseLevel::Advanced => "Advanced",
    }
}

#[component]
fn CourseCard(course: Course) -> Element {
    let level = level_label(course.level);
    rsx! {
        article { class: "card course-card",
            span { class: "badge", "{level}" }
            h3 { "{course.title}" }
            if let Some(description) = course.description.as_deref() {
                p { "{description}" }
            }
        }
    }
}

/// Public course catalog.
#[component]
pub fn CourseList() -> Element {
    let ctx = use_context::<AppContext>();
    let catalog = ctx.catalog();
    let resource = use_resource(move || {
        let catalog = catalog.clone();
        async move {
            catalog
                .courses()
                .await
                .map_err(|err| ViewError::from_api(&err))
        }
    });
    let state = view_state_from_resource(&resource);

    rsx! {
        section { class: "courses",
            h2 { "Available courses" }
            match state {
                ViewState::Idle | ViewState::Loading => rsx! { p { "Loading courses..." } },
                ViewState::Ready(courses) if courses.is_empty() => rsx! {
                    p { class: "muted", "No courses available yet." }
                },
                ViewState::Ready(courses) => rsx! {
                    div { class: "grid",
                        for course in courses {
                            CourseCard { key: "{course.id}", course }
                        }
                    }
                },
                ViewState::Error(error) => rsx! {
                    ErrorPanel {
                        error,
                        on_retry: move |()| {
                            let mut resource = resource;
                            resource.restart();
                        },
                    }
                },
            }
        }
    }
}

#[component]
pub fn ProfileCard(user: User) -> Element {
    let profile = ProfileVm::from_user(&user);
    rsx! {
        section { class: "card profile",
            h2 { "Profile" }
            div { class: "profile-row",
                div { class: "avatar", "{profile.initials}" }
                div {
                    h3 { "{profile.display_name}" }
                    p { class: "muted", "{profile.email}" }
                    p { class: "role", "{profile.role_label}" }
                    if let Some(handle) = profile.handle {
                        p { class: "muted", "{handle}" }
                    }
                }
            }
        }
    }
}

#[component]
pub fn StatTile(label: String, value: String) -> Element {
    rsx! {
        div { class: "card stat",
            p { class: "stat-label", "{label}" }
            p { class: "stat-value", "{value}" }
        }
    }
}
