mod progress;
mod state;
mod workflow;

// Public API of the quiz-taking subsystem.
pub use crate::error::QuizSessionError;
pub use progress::{NavigatorDot, QuestionStatus, QuizProgress};
pub use state::{Completion, QuizPhase, QuizSession, Ticket};
pub use workflow::QuizSessionService;
