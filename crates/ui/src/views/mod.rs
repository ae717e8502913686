mod components;
mod dashboard;
mod guard;
mod landing;
mod login;
mod modules;
mod not_found;
mod quiz;
mod register;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use dashboard::DashboardView;
pub use guard::{AUTHOR_ROLES, Protected};
pub use landing::LandingView;
pub use login::LoginView;
pub use modules::{ModuleCreateView, ModuleDetailView, ModuleEditView, ModuleListView};
pub use not_found::NotFoundView;
pub use quiz::QuizView;
pub use register::RegisterView;
pub use state::{ViewError, ViewState, view_state_from_resource};
