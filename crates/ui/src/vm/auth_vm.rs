use academy_core::model::{RegisterRequest, User};
use api::ApiError;
use services::AuthError;

const MIN_PASSWORD_LEN: usize = 6;
const MIN_USERNAME_LEN: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterField {
    Email,
    Username,
    Password,
    ConfirmPassword,
    General,
}

/// A message attached to one field of the registration form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: RegisterField,
    pub message: String,
}

impl FieldError {
    fn new(field: RegisterField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[must_use]
pub fn error_for(errors: &[FieldError], field: RegisterField) -> Option<String> {
    errors
        .iter()
        .find(|e| e.field == field)
        .map(|e| e.message.clone())
}

/// Raw registration form input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFormVm {
    pub email: String,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub password: String,
    pub confirm_password: String,
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

impl RegisterFormVm {
    /// Check the form before it is sent.
    ///
    /// # Errors
    ///
    /// Returns every field problem found.
    pub fn validate(&self) -> Result<RegisterRequest, Vec<FieldError>> {
        let mut errors = Vec::new();
        let email = self.email.trim();

        if email.is_empty() {
            errors.push(FieldError::new(RegisterField::Email, "Email is required"));
        } else if !looks_like_email(email) {
            errors.push(FieldError::new(RegisterField::Email, "Invalid email format"));
        }

        if self.password.is_empty() {
            errors.push(FieldError::new(RegisterField::Password, "Password is required"));
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                RegisterField::Password,
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }

        if self.confirm_password.is_empty() {
            errors.push(FieldError::new(
                RegisterField::ConfirmPassword,
                "Please confirm your password",
            ));
        } else if self.password != self.confirm_password {
            errors.push(FieldError::new(
                RegisterField::ConfirmPassword,
                "Passwords do not match",
            ));
        }

        let username = optional(&self.username);
        if username
            .as_deref()
            .is_some_and(|name| name.chars().count() < MIN_USERNAME_LEN)
        {
            errors.push(FieldError::new(
                RegisterField::Username,
                format!("Username must be at least {MIN_USERNAME_LEN} characters"),
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(RegisterRequest {
            email: email.to_owned(),
            password: self.password.clone(),
            username,
            firstname: optional(&self.firstname),
            lastname: optional(&self.lastname),
            picture_profile: None,
        })
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Attach a failed registration to the field it concerns.
#[must_use]
pub fn registration_error(err: &AuthError) -> FieldError {
    let detail = match err {
        AuthError::Api(api) => api.detail().unwrap_or_default().to_owned(),
        _ => String::new(),
    };
    if detail.contains("Email already registered") {
        FieldError::new(RegisterField::Email, "This email is already in use")
    } else if detail.contains("Username already taken") {
        FieldError::new(RegisterField::Username, "This username is already taken")
    } else {
        FieldError::new(RegisterField::General, auth_error_message(err))
    }
}

/// User-facing text for sign-in failures.
#[must_use]
pub fn auth_error_message(err: &AuthError) -> String {
    match err {
        AuthError::InvalidCredentials => "Incorrect email/username or password.".to_owned(),
        AuthError::Api(ApiError::Network(_)) => {
            "Cannot reach the server. Check your connection and try again.".to_owned()
        }
        other => other.to_string(),
    }
}

/// Profile card contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileVm {
    pub display_name: String,
    pub email: String,
    pub role_label: &'static str,
    pub handle: Option<String>,
    pub initials: String,
}

impl ProfileVm {
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        let display_name = user.display_name();
        let initials = display_name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        Self {
            display_name,
            email: user.email.clone(),
            role_label: user.role.label(),
            handle: user.username.as_ref().map(|name| format!("@{name}")),
            initials,
        }
    }
}
