#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod module_service;
pub mod quiz;
pub mod quiz_authoring;

pub use academy_core::Clock;

pub use app_services::AppServices;
pub use auth::{AuthService, AuthState, GuardDecision, guard};
pub use catalog::CatalogService;
pub use error::{
    AppServicesError, AuthError, ModuleServiceError, QuizAuthoringError, QuizSessionError,
};
pub use module_service::{DEFAULT_LIMIT, DEFAULT_SKIP, ModuleService};
pub use quiz::{
    Completion, NavigatorDot, QuestionStatus, QuizPhase, QuizProgress, QuizSession,
    QuizSessionService, Ticket,
};
pub use quiz_authoring::QuizAuthoringService;
