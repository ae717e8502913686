mod detail;
mod form;
mod list;
mod quiz_editor;

pub use detail::ModuleDetailView;
pub use form::{ModuleCreateView, ModuleEditView};
pub use list::ModuleListView;
