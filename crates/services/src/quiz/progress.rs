use academy_core::model::QuestionId;

/// Aggregated view of attempt progress, useful for UI.
///
/// `percentage` follows the current position, not the answered count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizProgress {
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub percentage: f64,
}

impl QuizProgress {
    #[must_use]
    pub fn new(current_index: usize, total: usize, answered: usize) -> Self {
        let position = if total == 0 { 0 } else { current_index + 1 };
        let percentage = if total == 0 {
            0.0
        } else {
            position as f64 / total as f64 * 100.0
        };
        Self {
            position,
            total,
            answered,
            percentage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    Current,
    Answered,
    Unanswered,
}

/// One entry of the question navigator strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorDot {
    pub index: usize,
    pub question_id: QuestionId,
    pub status: QuestionStatus,
}
