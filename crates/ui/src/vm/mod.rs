mod auth_vm;
mod markdown_vm;
mod module_vm;
mod quiz_editor_vm;
mod quiz_vm;
mod time_fmt;

pub use auth_vm::{
    FieldError, ProfileVm, RegisterField, RegisterFormVm, auth_error_message, error_for,
    registration_error,
};
pub use markdown_vm::{excerpt, markdown_to_html, normalize_markdown, sanitize_html};
pub use module_vm::{
    ModuleCardVm, ModuleContentVm, ModuleCounts, ModuleFormVm, PageVm, map_module_cards,
};
pub use quiz_editor_vm::QuizEditorVm;
pub use quiz_vm::{
    ChoiceVm, QuestionVm, QuizHeaderVm, QuizResultVm, ReviewChoiceVm, ReviewItemVm, ScoreBand,
    ScoreTone, format_elapsed, format_score, navigator_class, session_error_message, submit_label,
};
pub use time_fmt::format_date;
