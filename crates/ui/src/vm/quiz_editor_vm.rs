use academy_core::model::{ChoiceDraft, KeyedQuestion, QuestionDraft, QuizDraft};

/// Working copy of a quiz while an author edits it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizEditorVm {
    draft: QuizDraft,
    /// Whether the module already has a quiz; decides create vs replace.
    existing: bool,
}

fn blank_choice(is_correct: bool) -> ChoiceDraft {
    ChoiceDraft {
        text: String::new(),
        is_correct,
        order: None,
    }
}

fn blank_question() -> QuestionDraft {
    QuestionDraft {
        text: String::new(),
        order: None,
        choices: vec![blank_choice(true), blank_choice(false)],
    }
}

impl QuizEditorVm {
    /// Empty editor with one blank question.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            draft: QuizDraft {
                title: title.into(),
                questions: vec![blank_question()],
            },
            existing: false,
        }
    }

    /// Editor seeded from an existing answer key.
    #[must_use]
    pub fn from_key(title: impl Into<String>, key: &[KeyedQuestion]) -> Self {
        let questions = key
            .iter()
            .map(|question| QuestionDraft {
                text: question.text.clone(),
                order: question.order,
                choices: question
                    .choices
                    .iter()
                    .map(|choice| ChoiceDraft {
                        text: choice.text.clone(),
                        is_correct: choice.is_correct,
                        order: choice.order,
                    })
                    .collect(),
            })
            .collect();
        Self {
            draft: QuizDraft {
                title: title.into(),
                questions,
            },
            existing: true,
        }
    }

    #[must_use]
    pub fn is_existing(&self) -> bool {
        self.existing
    }

    pub fn mark_saved(&mut self) {
        self.existing = true;
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.draft.title
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionDraft] {
        &self.draft.questions
    }

    pub fn set_title(&mut self, title: String) {
        self.draft.title = title;
    }

    pub fn add_question(&mut self) {
        self.draft.questions.push(blank_question());
    }

    pub fn remove_question(&mut self, index: usize) {
        if index < self.draft.questions.len() {
            self.draft.questions.remove(index);
        }
    }

    pub fn set_question_text(&mut self, index: usize, text: String) {
        if let Some(question) = self.draft.questions.get_mut(index) {
            question.text = text;
        }
    }

    pub fn add_choice(&mut self, question: usize) {
        if let Some(question) = self.draft.questions.get_mut(question) {
            question.choices.push(blank_choice(false));
        }
    }

    pub fn remove_choice(&mut self, question: usize, choice: usize) {
        if let Some(question) = self.draft.questions.get_mut(question) {
            if choice < question.choices.len() {
                question.choices.remove(choice);
            }
        }
    }

    pub fn set_choice_text(&mut self, question: usize, choice: usize, text: String) {
        if let Some(choice) = self
            .draft
            .questions
            .get_mut(question)
            .and_then(|q| q.choices.get_mut(choice))
        {
            choice.text = text;
        }
    }

    /// Make `choice` the only correct option of `question`.
    pub fn set_correct(&mut self, question: usize, choice: usize) {
        if let Some(question) = self.draft.questions.get_mut(question) {
            for (index, option) in question.choices.iter_mut().enumerate() {
                option.is_correct = index == choice;
            }
        }
    }

    /// Draft with 1-based display order filled in for questions and choices.
    #[must_use]
    pub fn to_draft(&self) -> QuizDraft {
        let mut draft = self.draft.clone();
        for (q_index, question) in draft.questions.iter_mut().enumerate() {
            question.order = Some(position(q_index));
            for (c_index, choice) in question.choices.iter_mut().enumerate() {
                choice.order = Some(position(c_index));
            }
        }
        draft
    }
}

fn position(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}
