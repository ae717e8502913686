use dioxus::prelude::*;

use api::ApiError;
use services::{AuthError, ModuleServiceError, QuizAuthoringError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unknown,
    NotFound,
    Forbidden,
    SignedOut,
    Offline,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::Unknown => "Something went wrong. Please try again.",
            ViewError::NotFound => "This page does not exist.",
            ViewError::Forbidden => "You do not have access to this page.",
            ViewError::SignedOut => "Your session has expired. Please sign in again.",
            ViewError::Offline => "Cannot reach the server. Check your connection.",
        }
    }

    #[must_use]
    pub fn from_api(err: &ApiError) -> Self {
        match err {
            ApiError::Unauthorized => ViewError::SignedOut,
            ApiError::Forbidden(_) => ViewError::Forbidden,
            ApiError::NotFound(_) => ViewError::NotFound,
            ApiError::Network(_) => ViewError::Offline,
            _ => ViewError::Unknown,
        }
    }
}

impl From<&ModuleServiceError> for ViewError {
    fn from(err: &ModuleServiceError) -> Self {
        match err {
            ModuleServiceError::NotAuthor => ViewError::Forbidden,
            ModuleServiceError::Api(api) => ViewError::from_api(api),
            _ => ViewError::Unknown,
        }
    }
}

impl From<&QuizAuthoringError> for ViewError {
    fn from(err: &QuizAuthoringError) -> Self {
        match err {
            QuizAuthoringError::NotAuthor => ViewError::Forbidden,
            QuizAuthoringError::Api(api) => ViewError::from_api(api),
            _ => ViewError::Unknown,
        }
    }
}

impl From<&AuthError> for ViewError {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::NotSignedIn | AuthError::InvalidCredentials => ViewError::SignedOut,
            AuthError::Api(api) => ViewError::from_api(api),
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_view_errors() {
        assert_eq!(ViewError::from_api(&ApiError::Unauthorized), ViewError::SignedOut);
        assert_eq!(
            ViewError::from_api(&ApiError::NotFound("Module not found".into())),
            ViewError::NotFound
        );
        assert_eq!(
            ViewError::from(&ModuleServiceError::NotAuthor),
            ViewError::Forbidden
        );
        assert_eq!(
            ViewError::from_api(&ApiError::Decode("bad".into())),
            ViewError::Unknown
        );
    }
}
