use serde::Serialize;
use thiserror::Error;

/// A single problem found while validating a quiz draft.
///
/// Positions are 1-based so they can be shown to authors as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizDraftIssue {
    #[error("quiz title is required")]
    MissingTitle,

    #[error("quiz must have at least one question")]
    NoQuestions,

    #[error("question {position} must have text")]
    MissingQuestionText { position: usize },

    #[error("question {position} must have at least 2 choices")]
    TooFewChoices { position: usize },

    #[error("question {position} must have exactly one correct choice (found {found})")]
    CorrectChoiceCount { position: usize, found: usize },
}

/// All issues of a rejected draft, reported together.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid quiz draft ({} issue(s))", .issues.len())]
pub struct QuizDraftError {
    issues: Vec<QuizDraftIssue>,
}

impl QuizDraftError {
    #[must_use]
    pub fn issues(&self) -> &[QuizDraftIssue] {
        &self.issues
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceDraft {
    pub text: String,
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionDraft {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    pub choices: Vec<ChoiceDraft>,
}

/// Authoring payload for creating or replacing a module's quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizDraft {
    pub title: String,
    pub questions: Vec<QuestionDraft>,
}

impl QuizDraft {
    /// Check the draft before it is sent anywhere.
    ///
    /// # Errors
    ///
    /// Returns `QuizDraftError` listing every issue found.
    pub fn validate(&self) -> Result<(), QuizDraftError> {
        let mut issues = Vec::new();

        if self.title.trim().is_empty() {
            issues.push(QuizDraftIssue::MissingTitle);
        }
        if self.questions.is_empty() {
            issues.push(QuizDraftIssue::NoQuestions);
        }

        for (index, question) in self.questions.iter().enumerate() {
            let position = index + 1;
            if question.text.trim().is_empty() {
                issues.push(QuizDraftIssue::MissingQuestionText { position });
            }
            if question.choices.len() < 2 {
                issues.push(QuizDraftIssue::TooFewChoices { position });
            }
            let found = question.choices.iter().filter(|c| c.is_correct).count();
            if found != 1 {
                issues.push(QuizDraftIssue::CorrectChoiceCount { position, found });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(QuizDraftError { issues })
        }
    }
}
