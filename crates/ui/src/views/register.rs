use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use crate::context::{AppContext, use_auth_state};
use crate::routes::Route;
use crate::vm::{FieldError, RegisterField, RegisterFormVm, error_for, registration_error};

#[component]
fn FieldMessage(errors: Vec<FieldError>, field: RegisterField) -> Element {
    match error_for(&errors, field) {
        Some(message) => rsx! { p { class: "field-error", "{message}" } },
        None => rsx! {},
    }
}

#[component]
pub fn RegisterView() -> Element {
    let ctx = use_context::<AppContext>();
    let auth_state = use_auth_state();
    let navigator = use_navigator();

    let mut form = use_signal(RegisterFormVm::default);
    let mut errors = use_signal(Vec::<FieldError>::new);
    let mut submitting = use_signal(|| false);

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
        let request = match form.peek().validate() {
            Ok(request) => request,
            Err(found) => {
                errors.set(found);
                return;
            }
        };
        let ctx = ctx.clone();
        spawn(async move {
            submitting.set(true);
            errors.set(Vec::new());
            let result = ctx.auth().register(request).await;
            submitting.set(false);
            match result {
                Ok(_) => {
                    ctx.sync_auth(auth_state);
                    navigator.push(Route::Dashboard {});
                }
                Err(err) => errors.set(vec![registration_error(&err)]),
            }
        });
    };

    let current = form.read().clone();
    let field_errors = errors.read().clone();

    rsx! {
        div { class: "page page-center",
            form { class: "card form auth-form", onsubmit: on_submit,
                h2 { "Create your account" }
                FieldMessage { errors: field_errors.clone(), field: RegisterField::General }

                label { r#for: "register-email", "Email" }
                input {
                    id: "register-email",
                    r#type: "email",
                    value: "{current.email}",
                    oninput: move |evt| form.write().email = evt.value(),
                }
                FieldMessage { errors: field_errors.clone(), field: RegisterField::Email }

                label { r#for: "register-username", "Username (optional)" }
                input {
                    id: "register-username",
                    r#type: "text",
                    value: "{current.username}",
                    oninput: move |evt| form.write().username = evt.value(),
                }
                FieldMessage { errors: field_errors.clone(), field: RegisterField::Username }

                div { class: "form-row",
                    div {
                        label { r#for: "register-firstname", "First name" }
                        input {
                            id: "register-firstname",
                            r#type: "text",
                            value: "{current.firstname}",
                            oninput: move |evt| form.write().firstname = evt.value(),
                        }
                    }
                    div {
                        label { r#for: "register-lastname", "Last name" }
                        input {
                            id: "register-lastname",
                            r#type: "text",
                            value: "{current.lastname}",
                            oninput: move |evt| form.write().lastname = evt.value(),
                        }
                    }
                }

                label { r#for: "register-password", "Password" }
                input {
                    id: "register-password",
                    r#type: "password",
                    autocomplete: "new-password",
                    value: "{current.password}",
                    oninput: move |evt| form.write().password = evt.value(),
                }
                FieldMessage { errors: field_errors.clone(), field: RegisterField::Password }

                label { r#for: "register-confirm", "Confirm password" }
                input {
                    id: "register-confirm",
                    r#type: "password",
                    autocomplete: "new-password",
                    value: "{current.confirm_password}",
                    oninput: move |evt| form.write().confirm_password = evt.value(),
                }
                FieldMessage { errors: field_errors, field: RegisterField::ConfirmPassword }

                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Creating account..." } else { "Create account" }
                }
                p { class: "muted",
                    "Already registered? "
                    Link { to: Route::Login {}, "Sign in" }
                }
            }
        }
    }
}
