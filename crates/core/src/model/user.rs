use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;
use crate::model::timestamp;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("username or email is required")]
    MissingLogin,

    #[error("password is required")]
    MissingPassword,

    #[error("email address looks invalid: {0:?}")]
    InvalidEmail(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Instructor => "Instructor",
            Role::Admin => "Administrator",
        }
    }

    /// Instructors and admins may author modules and quizzes.
    #[must_use]
    pub fn can_author(self) -> bool {
        matches!(self, Role::Instructor | Role::Admin)
    }
}

/// The signed-in account. Persisted alongside the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub picture_profile: Option<String>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Full name when known, then username, then email.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.firstname.as_deref(), self.lastname.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_owned(),
            (None, None) => self
                .username
                .clone()
                .unwrap_or_else(|| self.email.clone()),
        }
    }
}

/// Profile visible to other users.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserPublic {
    pub id: UserId,
    pub role: Role,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub picture_profile: Option<String>,
}

/// Partial profile update for the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    /// `username` may be either a username or an email.
    ///
    /// # Errors
    ///
    /// Returns `UserError` when a field is blank.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, UserError> {
        let username = username.into().trim().to_owned();
        let password = password.into();
        if username.is_empty() {
            return Err(UserError::MissingLogin);
        }
        if password.is_empty() {
            return Err(UserError::MissingPassword);
        }
        Ok(Self { username, password })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_profile: Option<String>,
}

impl RegisterRequest {
    /// # Errors
    ///
    /// Returns `UserError::InvalidEmail` or `UserError::MissingPassword`.
    pub fn validate(mut self) -> Result<Self, UserError> {
        self.email = self.email.trim().to_owned();
        if !self.email.contains('@') || self.email.starts_with('@') || self.email.ends_with('@') {
            return Err(UserError::InvalidEmail(self.email));
        }
        if self.password.is_empty() {
            return Err(UserError::MissingPassword);
        }
        self.username = self
            .username
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());
        Ok(self)
    }
}
