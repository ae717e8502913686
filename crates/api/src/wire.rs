//! JSON shapes exchanged with the backend and their conversion into domain types.

use academy_core::model::{
    Answer, Choice, ChoiceId, ChoiceRef, Course, KeyedChoice, KeyedQuestion, ModuleId, Question,
    QuestionId, QuestionResult, Quiz, QuizError, QuizId, QuizResult,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ChoiceDto {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct QuestionDto {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub order: Option<u32>,
    pub choices: Vec<ChoiceDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct QuizDto {
    pub id: u64,
    pub module_id: u64,
    pub title: String,
    pub questions: Vec<QuestionDto>,
}

impl TryFrom<QuizDto> for Quiz {
    type Error = QuizError;

    fn try_from(dto: QuizDto) -> Result<Self, Self::Error> {
        let questions = dto
            .questions
            .into_iter()
            .map(|question| {
                let choices = question
                    .choices
                    .into_iter()
                    .map(|choice| Choice::new(ChoiceId::new(choice.id), choice.text, choice.order))
                    .collect();
                Question::new(
                    QuestionId::new(question.id),
                    question.text,
                    question.order,
                    choices,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Quiz::new(
            QuizId::new(dto.id),
            ModuleId::new(dto.module_id),
            dto.title,
            questions,
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct AnswerDto {
    pub question_id: u64,
    pub choice_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SubmissionDto {
    pub answers: Vec<AnswerDto>,
}

impl SubmissionDto {
    pub fn from_answers(answers: &[Answer]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|answer| AnswerDto {
                    question_id: answer.question_id.value(),
                    choice_id: answer.choice_id.value(),
                })
                .collect(),
        }
    }
}

/// `selected_choice_id == 0` marks an unanswered question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct QuestionResultDto {
    pub question_id: u64,
    pub question_text: String,
    pub selected_choice_id: u64,
    pub selected_choice_text: String,
    pub correct_choice_id: u64,
    pub correct_choice_text: String,
    pub is_correct: bool,
}

pub(crate) const UNANSWERED_CHOICE_ID: u64 = 0;

impl From<QuestionResultDto> for QuestionResult {
    fn from(dto: QuestionResultDto) -> Self {
        let selected = (dto.selected_choice_id != UNANSWERED_CHOICE_ID).then(|| ChoiceRef {
            id: ChoiceId::new(dto.selected_choice_id),
            text: dto.selected_choice_text,
        });
        Self {
            question_id: QuestionId::new(dto.question_id),
            question_text: dto.question_text,
            selected,
            correct: ChoiceRef {
                id: ChoiceId::new(dto.correct_choice_id),
                text: dto.correct_choice_text,
            },
            is_correct: dto.is_correct,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct QuizResultDto {
    pub total: u32,
    pub correct: u32,
    pub score_percentage: f64,
    pub details: Vec<QuestionResultDto>,
}

impl TryFrom<QuizResultDto> for QuizResult {
    type Error = QuizError;

    fn try_from(dto: QuizResultDto) -> Result<Self, Self::Error> {
        QuizResult::new(
            dto.total,
            dto.correct,
            dto.score_percentage,
            dto.details.into_iter().map(QuestionResult::from).collect(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct KeyedChoiceDto {
    pub id: u64,
    pub text: String,
    pub is_correct: bool,
    #[serde(default)]
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct KeyedQuestionDto {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub order: Option<u32>,
    pub choices: Vec<KeyedChoiceDto>,
}

impl From<KeyedQuestionDto> for KeyedQuestion {
    fn from(dto: KeyedQuestionDto) -> Self {
        Self {
            id: QuestionId::new(dto.id),
            text: dto.text,
            order: dto.order,
            choices: dto
                .choices
                .into_iter()
                .map(|choice| KeyedChoice {
                    id: ChoiceId::new(choice.id),
                    text: choice.text,
                    order: choice.order,
                    is_correct: choice.is_correct,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenDto {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoursesDto {
    pub courses: Vec<Course>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_payload_decodes_in_server_order() {
        let json = r#"{
            "id": 4, "module_id": 9, "title": "Basics",
            "created_at": "2024-03-01T10:00:00", "updated_at": "2024-03-01T10:00:00",
            "questions": [
                {"id": 11, "text": "First", "order": 0,
                 "choices": [{"id": 1, "text": "a", "order": 0}, {"id": 2, "text": "b", "order": 1}]},
                {"id": 12, "text": "Second",
                 "choices": [{"id": 3, "text": "c"}, {"id": 4, "text": "d"}]}
            ]
        }"#;
        let dto: QuizDto = serde_json::from_str(json).unwrap();
        let quiz = Quiz::try_from(dto).unwrap();

        assert_eq!(quiz.module_id(), ModuleId::new(9));
        assert_eq!(quiz.question_at(1).unwrap().id(), QuestionId::new(12));
        assert_eq!(quiz.question_at(1).unwrap().order(), None);
    }

    #[test]
    fn quiz_with_single_choice_question_is_rejected() {
        let json = r#"{"id": 1, "module_id": 1, "title": "T",
            "questions": [{"id": 1, "text": "Q", "choices": [{"id": 1, "text": "only"}]}]}"#;
        let dto: QuizDto = serde_json::from_str(json).unwrap();
        assert!(matches!(
            Quiz::try_from(dto),
            Err(QuizError::TooFewChoices { .. })
        ));
    }

    #[test]
    fn zero_selected_choice_decodes_as_unanswered() {
        let json = r#"{
            "total": 2, "correct": 1, "score_percentage": 50.0,
            "details": [
                {"question_id": 1, "question_text": "Q1", "selected_choice_id": 2,
                 "selected_choice_text": "b", "correct_choice_id": 2,
                 "correct_choice_text": "b", "is_correct": true},
                {"question_id": 2, "question_text": "Q2", "selected_choice_id": 0,
                 "selected_choice_text": "Aucune réponse", "correct_choice_id": 4,
                 "correct_choice_text": "d", "is_correct": false}
            ]
        }"#;
        let dto: QuizResultDto = serde_json::from_str(json).unwrap();
        let result = QuizResult::try_from(dto).unwrap();

        assert!(!result.details()[0].is_unanswered());
        assert!(result.details()[1].is_unanswered());
        assert_eq!(result.details()[1].correct.id, ChoiceId::new(4));
    }

    #[test]
    fn submission_serializes_flat_answers() {
        let answers = [Answer {
            question_id: QuestionId::new(3),
            choice_id: ChoiceId::new(8),
        }];
        let json = serde_json::to_value(SubmissionDto::from_answers(&answers)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"answers": [{"question_id": 3, "choice_id": 8}]})
        );
    }
}
