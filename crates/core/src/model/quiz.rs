use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::{ChoiceId, ModuleId, QuestionId, QuizId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("question {question_id} appears more than once")]
    DuplicateQuestion { question_id: QuestionId },

    #[error("question {question_id} needs at least 2 choices, got {count}")]
    TooFewChoices { question_id: QuestionId, count: usize },

    #[error("choice {choice_id} appears more than once in question {question_id}")]
    DuplicateChoice {
        question_id: QuestionId,
        choice_id: ChoiceId,
    },

    #[error("correct count ({correct}) exceeds total ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("score percentage must be within 0..=100")]
    InvalidScore,
}

//
// ─── QUIZ DEFINITION ───────────────────────────────────────────────────────────
//

/// A selectable answer option. Correctness is never known before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    id: ChoiceId,
    text: String,
    order: Option<u32>,
}

impl Choice {
    #[must_use]
    pub fn new(id: ChoiceId, text: impl Into<String>, order: Option<u32>) -> Self {
        Self {
            id,
            text: text.into(),
            order,
        }
    }

    #[must_use]
    pub fn id(&self) -> ChoiceId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn order(&self) -> Option<u32> {
        self.order
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    order: Option<u32>,
    choices: Vec<Choice>,
}

impl Question {
    /// Build a question, keeping the choices in the order given.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::TooFewChoices` for fewer than two choices and
    /// `QuizError::DuplicateChoice` when a choice id repeats.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        order: Option<u32>,
        choices: Vec<Choice>,
    ) -> Result<Self, QuizError> {
        if choices.len() < 2 {
            return Err(QuizError::TooFewChoices {
                question_id: id,
                count: choices.len(),
            });
        }
        let mut seen = HashSet::with_capacity(choices.len());
        for choice in &choices {
            if !seen.insert(choice.id) {
                return Err(QuizError::DuplicateChoice {
                    question_id: id,
                    choice_id: choice.id,
                });
            }
        }

        Ok(Self {
            id,
            text: text.into(),
            order,
            choices,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn order(&self) -> Option<u32> {
        self.order
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[must_use]
    pub fn choice(&self, id: ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == id)
    }

    #[must_use]
    pub fn has_choice(&self, id: ChoiceId) -> bool {
        self.choice(id).is_some()
    }
}

/// A named, ordered set of questions tied to one module.
///
/// Immutable once constructed; a quiz attempt only ever reads from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    module_id: ModuleId,
    title: String,
    questions: Vec<Question>,
}

impl Quiz {
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` for an empty quiz and
    /// `QuizError::DuplicateQuestion` when a question id repeats.
    pub fn new(
        id: QuizId,
        module_id: ModuleId,
        title: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id) {
                return Err(QuizError::DuplicateQuestion {
                    question_id: question.id,
                });
            }
        }

        Ok(Self {
            id,
            module_id,
            title: title.into(),
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Always at least one.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    #[must_use]
    pub fn position_of(&self, id: QuestionId) -> Option<usize> {
        self.questions.iter().position(|question| question.id == id)
    }
}

/// One selected choice for one question, as sent on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Answer {
    pub question_id: QuestionId,
    pub choice_id: ChoiceId,
}

//
// ─── GRADED RESULT ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRef {
    pub id: ChoiceId,
    pub text: String,
}

/// How a single choice should be presented in review mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceMark {
    /// The user picked it and it is the correct one.
    SelectedCorrect,
    /// The user picked it but it is wrong.
    SelectedIncorrect,
    /// Not picked, but it is the correct answer.
    Correct,
    Neutral,
}

/// Graded outcome for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub question_id: QuestionId,
    pub question_text: String,
    /// `None` when the question was left unanswered.
    pub selected: Option<ChoiceRef>,
    pub correct: ChoiceRef,
    pub is_correct: bool,
}

impl QuestionResult {
    /// Review marking for a choice. The correct answer is always marked,
    /// whether or not it was the one selected.
    #[must_use]
    pub fn mark_for(&self, choice_id: ChoiceId) -> ChoiceMark {
        let is_selected = self.selected.as_ref().is_some_and(|s| s.id == choice_id);
        let is_right = self.correct.id == choice_id;
        match (is_selected, is_right) {
            (true, true) => ChoiceMark::SelectedCorrect,
            (true, false) => ChoiceMark::SelectedIncorrect,
            (false, true) => ChoiceMark::Correct,
            (false, false) => ChoiceMark::Neutral,
        }
    }

    #[must_use]
    pub fn is_unanswered(&self) -> bool {
        self.selected.is_none()
    }
}

/// Server-graded result of a submission.
///
/// The score percentage is displayed exactly as returned; it is never
/// recomputed from `correct / total`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    total: u32,
    correct: u32,
    score_percentage: f64,
    details: Vec<QuestionResult>,
}

impl QuizResult {
    /// # Errors
    ///
    /// Returns `QuizError::CorrectExceedsTotal` or `QuizError::InvalidScore`
    /// for results that cannot be displayed consistently.
    pub fn new(
        total: u32,
        correct: u32,
        score_percentage: f64,
        details: Vec<QuestionResult>,
    ) -> Result<Self, QuizError> {
        if correct > total {
            return Err(QuizError::CorrectExceedsTotal { correct, total });
        }
        if !score_percentage.is_finite() || !(0.0..=100.0).contains(&score_percentage) {
            return Err(QuizError::InvalidScore);
        }
        Ok(Self {
            total,
            correct,
            score_percentage,
            details,
        })
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.total - self.correct
    }

    #[must_use]
    pub fn score_percentage(&self) -> f64 {
        self.score_percentage
    }

    #[must_use]
    pub fn details(&self) -> &[QuestionResult] {
        &self.details
    }

    #[must_use]
    pub fn detail_for(&self, question_id: QuestionId) -> Option<&QuestionResult> {
        self.details.iter().find(|d| d.question_id == question_id)
    }
}

/// Choice as seen by authors, including the answer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedChoice {
    pub id: ChoiceId,
    pub text: String,
    pub order: Option<u32>,
    pub is_correct: bool,
}

/// Question plus its answer key (instructor view).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedQuestion {
    pub id: QuestionId,
    pub text: String,
    pub order: Option<u32>,
    pub choices: Vec<KeyedChoice>,
}

impl KeyedQuestion {
    #[must_use]
    pub fn correct_choice(&self) -> Option<&KeyedChoice> {
        self.choices.iter().find(|choice| choice.is_correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(id: u64) -> Choice {
        Choice::new(ChoiceId::new(id), format!("C{id}"), None)
    }

    fn result_with(selected: Option<u64>, correct: u64) -> QuestionResult {
        QuestionResult {
            question_id: QuestionId::new(1),
            question_text: "Q".into(),
            selected: selected.map(|id| ChoiceRef {
                id: ChoiceId::new(id),
                text: format!("C{id}"),
            }),
            correct: ChoiceRef {
                id: ChoiceId::new(correct),
                text: format!("C{correct}"),
            },
            is_correct: selected == Some(correct),
        }
    }

    #[test]
    fn question_requires_two_choices() {
        let err = Question::new(QuestionId::new(1), "Q", None, vec![choice(1)]).unwrap_err();
        assert_eq!(
            err,
            QuizError::TooFewChoices {
                question_id: QuestionId::new(1),
                count: 1
            }
        );
    }

    #[test]
    fn question_rejects_duplicate_choices() {
        let err =
            Question::new(QuestionId::new(1), "Q", None, vec![choice(1), choice(1)]).unwrap_err();
        assert!(matches!(err, QuizError::DuplicateChoice { .. }));
    }

    #[test]
    fn quiz_rejects_empty_and_duplicate_questions() {
        let err = Quiz::new(QuizId::new(1), ModuleId::new(1), "T", Vec::new()).unwrap_err();
        assert_eq!(err, QuizError::NoQuestions);

        let q = Question::new(QuestionId::new(3), "Q", None, vec![choice(1), choice(2)]).unwrap();
        let err = Quiz::new(QuizId::new(1), ModuleId::new(1), "T", vec![q.clone(), q]).unwrap_err();
        assert_eq!(
            err,
            QuizError::DuplicateQuestion {
                question_id: QuestionId::new(3)
            }
        );
    }

    #[test]
    fn quiz_lookup_by_id_and_position() {
        let q1 = Question::new(QuestionId::new(10), "A", None, vec![choice(1), choice(2)]).unwrap();
        let q2 = Question::new(QuestionId::new(20), "B", None, vec![choice(3), choice(4)]).unwrap();
        let quiz = Quiz::new(QuizId::new(1), ModuleId::new(5), "T", vec![q1, q2]).unwrap();

        assert_eq!(quiz.question_count(), 2);
        assert_eq!(quiz.position_of(QuestionId::new(20)), Some(1));
        assert!(quiz.question(QuestionId::new(20)).unwrap().has_choice(ChoiceId::new(4)));
        assert!(quiz.question_at(2).is_none());
    }

    #[test]
    fn review_marks_show_both_choices_when_wrong() {
        let detail = result_with(Some(2), 3);
        assert_eq!(detail.mark_for(ChoiceId::new(2)), ChoiceMark::SelectedIncorrect);
        assert_eq!(detail.mark_for(ChoiceId::new(3)), ChoiceMark::Correct);
        assert_eq!(detail.mark_for(ChoiceId::new(4)), ChoiceMark::Neutral);
    }

    #[test]
    fn review_marks_single_choice_when_right() {
        let detail = result_with(Some(3), 3);
        assert_eq!(detail.mark_for(ChoiceId::new(3)), ChoiceMark::SelectedCorrect);
    }

    #[test]
    fn unanswered_detail_still_marks_correct_choice() {
        let detail = result_with(None, 3);
        assert!(detail.is_unanswered());
        assert_eq!(detail.mark_for(ChoiceId::new(3)), ChoiceMark::Correct);
    }

    #[test]
    fn result_keeps_server_score() {
        let result = QuizResult::new(5, 4, 80.0, Vec::new()).unwrap();
        assert!((result.score_percentage() - 80.0).abs() < f64::EPSILON);
        assert_eq!(result.incorrect(), 1);
    }

    #[test]
    fn result_rejects_inconsistent_counts() {
        assert!(matches!(
            QuizResult::new(2, 3, 100.0, Vec::new()),
            Err(QuizError::CorrectExceedsTotal { .. })
        ));
        assert_eq!(
            QuizResult::new(2, 1, 120.0, Vec::new()).unwrap_err(),
            QuizError::InvalidScore
        );
    }
}
