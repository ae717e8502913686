mod course;
mod ids;
mod module;
mod quiz;
mod quiz_draft;
pub mod timestamp;
mod user;

pub use ids::{ChoiceId, CourseId, ModuleId, ParseIdError, QuestionId, QuizId, UserId};

pub use course::{Course, CourseLevel, Health};
pub use module::{Module, ModuleDraft, ModuleError, ModuleKind, ModulePatch, ModuleStats, ModuleSummary};
pub use quiz::{
    Answer, Choice, ChoiceMark, ChoiceRef, KeyedChoice, KeyedQuestion, Question, QuestionResult,
    Quiz, QuizError, QuizResult,
};
pub use quiz_draft::{ChoiceDraft, QuestionDraft, QuizDraft, QuizDraftError, QuizDraftIssue};
pub use user::{LoginRequest, ProfilePatch, RegisterRequest, Role, User, UserError, UserPublic};
