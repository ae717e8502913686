use academy_core::model::{ChoiceId, ChoiceMark, Question, Quiz, QuizResult};
use services::{NavigatorDot, QuestionStatus, QuizPhase, QuizSession, QuizSessionError};

/// Elapsed time as `m:ss`.
#[must_use]
pub fn format_elapsed(seconds: u64) -> String {
    let minutes = seconds / 60;
    let remainder = seconds % 60;
    format!("{minutes}:{remainder:02}")
}

/// Feedback band for a final score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    VeryGood,
    Good,
    Pass,
    NeedsReview,
}

impl ScoreBand {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            ScoreBand::Excellent
        } else if score >= 80.0 {
            ScoreBand::VeryGood
        } else if score >= 70.0 {
            ScoreBand::Good
        } else if score >= 60.0 {
            ScoreBand::Pass
        } else {
            ScoreBand::NeedsReview
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent! You have mastered this module.",
            ScoreBand::VeryGood => "Very good! Just a few details to polish.",
            ScoreBand::Good => "Good work. Review the questions you missed.",
            ScoreBand::Pass => "You passed. A second read of the module will help.",
            ScoreBand::NeedsReview => "Keep going. Review the module and try again.",
        }
    }
}

/// Colour of the score badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreTone {
    Success,
    Warning,
    Danger,
}

impl ScoreTone {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreTone::Success
        } else if score >= 60.0 {
            ScoreTone::Warning
        } else {
            ScoreTone::Danger
        }
    }

    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            ScoreTone::Success => "score score--success",
            ScoreTone::Warning => "score score--warning",
            ScoreTone::Danger => "score score--danger",
        }
    }
}

/// Score as shown to the user, e.g. `80%` or `33.33%`.
#[must_use]
pub fn format_score(score: f64) -> String {
    let rounded = (score * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}%")
    } else {
        format!("{rounded}%")
    }
}

/// Header strip above the current question.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizHeaderVm {
    pub title: String,
    pub elapsed: String,
    pub position_label: String,
    pub answered_label: String,
    pub percentage: f64,
}

impl QuizHeaderVm {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        let progress = session.progress();
        Self {
            title: session
                .quiz()
                .map_or_else(String::new, |quiz| quiz.title().to_owned()),
            elapsed: format_elapsed(session.time_spent_seconds()),
            position_label: format!("Question {} of {}", progress.position, progress.total),
            answered_label: format!("{} / {} answered", progress.answered, progress.total),
            percentage: progress.percentage,
        }
    }

    /// Inline style for the progress bar fill.
    #[must_use]
    pub fn bar_style(&self) -> String {
        format!("width: {:.0}%;", self.percentage)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceVm {
    pub id: ChoiceId,
    pub text: String,
    pub selected: bool,
}

/// The question being answered and its options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub question: Question,
    pub choices: Vec<ChoiceVm>,
}

impl QuestionVm {
    #[must_use]
    pub fn current(session: &QuizSession) -> Option<Self> {
        let question = session.current_question()?.clone();
        let selected = session.selected_choice(question.id());
        let choices = question
            .choices()
            .iter()
            .map(|choice| ChoiceVm {
                id: choice.id(),
                text: choice.text().to_owned(),
                selected: selected == Some(choice.id()),
            })
            .collect();
        Some(Self { question, choices })
    }
}

#[must_use]
pub fn navigator_class(dot: &NavigatorDot) -> &'static str {
    match dot.status {
        QuestionStatus::Current => "dot dot--current",
        QuestionStatus::Answered => "dot dot--answered",
        QuestionStatus::Unanswered => "dot",
    }
}

#[must_use]
pub fn review_choice_class(mark: ChoiceMark) -> &'static str {
    match mark {
        ChoiceMark::SelectedCorrect => "choice choice--right",
        ChoiceMark::SelectedIncorrect => "choice choice--wrong",
        ChoiceMark::Correct => "choice choice--answer",
        ChoiceMark::Neutral => "choice",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewChoiceVm {
    pub text: String,
    pub class: &'static str,
}

/// One graded question on the review screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewItemVm {
    pub question_text: String,
    pub your_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub answered: bool,
    /// Every option of the question with its review marking. Empty when the
    /// quiz definition is not at hand.
    pub choices: Vec<ReviewChoiceVm>,
}

/// Summary shown once the quiz has been graded.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizResultVm {
    pub score_label: String,
    pub tone: ScoreTone,
    pub band: ScoreBand,
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    pub time_label: String,
    pub items: Vec<ReviewItemVm>,
}

impl QuizResultVm {
    #[must_use]
    pub fn new(result: &QuizResult, quiz: Option<&Quiz>, time_spent_seconds: u64) -> Self {
        let score = result.score_percentage();
        let items = result
            .details()
            .iter()
            .map(|detail| ReviewItemVm {
                question_text: detail.question_text.clone(),
                your_answer: detail
                    .selected
                    .as_ref()
                    .map_or_else(|| "No answer".to_owned(), |choice| choice.text.clone()),
                correct_answer: detail.correct.text.clone(),
                is_correct: detail.is_correct,
                answered: !detail.is_unanswered(),
                choices: quiz
                    .and_then(|quiz| quiz.question(detail.question_id))
                    .map(|question| {
                        question
                            .choices()
                            .iter()
                            .map(|choice| ReviewChoiceVm {
                                text: choice.text().to_owned(),
                                class: review_choice_class(detail.mark_for(choice.id())),
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();
        Self {
            score_label: format_score(score),
            tone: ScoreTone::from_score(score),
            band: ScoreBand::from_score(score),
            correct: result.correct(),
            incorrect: result.incorrect(),
            total: result.total(),
            time_label: format_elapsed(time_spent_seconds),
            items,
        }
    }
}

/// User-facing text for a session error.
#[must_use]
pub fn session_error_message(error: &QuizSessionError) -> String {
    if error.is_unauthorized() {
        "Your session has expired. Please sign in again.".to_owned()
    } else {
        error.to_string()
    }
}

/// Label for the primary action at the bottom of the quiz.
#[must_use]
pub fn submit_label(phase: QuizPhase) -> &'static str {
    if phase == QuizPhase::Submitting {
        "Submitting..."
    } else {
        "Submit answers"
    }
}
