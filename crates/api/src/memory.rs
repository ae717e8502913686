use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use academy_core::model::{
    Answer, Choice, ChoiceId, ChoiceRef, Course, CourseId, CourseLevel, Health, KeyedChoice,
    KeyedQuestion, LoginRequest, Module, ModuleDraft, ModuleId, ModulePatch, ModuleStats,
    ModuleSummary, ProfilePatch, Question, QuestionId, QuestionResult, Quiz, QuizDraft, QuizId,
    QuizResult, RegisterRequest, Role, User, UserId, UserPublic,
};
use academy_core::Clock;
use async_trait::async_trait;
use tracing::debug;

use crate::contract::{AuthApi, CatalogApi, ModuleApi, QuizApi};
use crate::credentials::{AccessToken, CredentialStore, Credentials, InMemoryCredentialStore};
use crate::error::ApiError;

const AUTHOR_ONLY: &str = "Instructor or admin access required";
const MODULE_NOT_FOUND: &str = "Module not found";
const QUIZ_NOT_FOUND: &str = "Aucun quiz trouvé pour ce module";
const QUIZ_MODULE_NOT_FOUND: &str = "Module non trouvé";

struct StoredUser {
    user: User,
    password: String,
}

struct StoredQuiz {
    id: QuizId,
    title: String,
    questions: Vec<KeyedQuestion>,
}

impl StoredQuiz {
    fn public(&self, module_id: ModuleId) -> Result<Quiz, ApiError> {
        let questions = self
            .questions
            .iter()
            .map(|question| {
                let choices = question
                    .choices
                    .iter()
                    .map(|choice| Choice::new(choice.id, choice.text.clone(), choice.order))
                    .collect();
                Question::new(question.id, question.text.clone(), question.order, choices)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| ApiError::Rejected(err.to_string()))?;
        Quiz::new(self.id, module_id, self.title.clone(), questions)
            .map_err(|err| ApiError::Rejected(err.to_string()))
    }

    /// Grades like the backend: unanswered questions count as wrong and
    /// questions without a correct choice are left out of the details.
    fn grade(&self, answers: &[Answer]) -> Result<QuizResult, ApiError> {
        let submitted: HashMap<QuestionId, ChoiceId> = answers
            .iter()
            .map(|answer| (answer.question_id, answer.choice_id))
            .collect();
        let total = u32::try_from(self.questions.len())
            .map_err(|err| ApiError::Rejected(err.to_string()))?;
        let mut correct = 0_u32;
        let mut details = Vec::with_capacity(self.questions.len());

        for question in &self.questions {
            let Some(right) = question.correct_choice() else {
                continue;
            };
            let selected = submitted
                .get(&question.id)
                .and_then(|id| question.choices.iter().find(|choice| choice.id == *id));
            let is_correct = selected.is_some_and(|choice| choice.is_correct);
            if is_correct {
                correct += 1;
            }
            details.push(QuestionResult {
                question_id: question.id,
                question_text: question.text.clone(),
                selected: selected.map(|choice| ChoiceRef {
                    id: choice.id,
                    text: choice.text.clone(),
                }),
                correct: ChoiceRef {
                    id: right.id,
                    text: right.text.clone(),
                },
                is_correct,
            });
        }

        let score = if total == 0 {
            0.0
        } else {
            (f64::from(correct) / f64::from(total) * 10_000.0).round() / 100.0
        };
        QuizResult::new(total, correct, score, details)
            .map_err(|err| ApiError::Rejected(err.to_string()))
    }
}

#[derive(Default)]
struct State {
    next_id: u64,
    users: BTreeMap<UserId, StoredUser>,
    tokens: HashMap<String, UserId>,
    modules: BTreeMap<ModuleId, Module>,
    quizzes: HashMap<ModuleId, StoredQuiz>,
    submissions: Vec<(ModuleId, Vec<Answer>)>,
    quiz_fetches: usize,
    fail_next_submit: Option<ApiError>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn issue_token(&mut self, user_id: UserId) -> AccessToken {
        let raw = format!("memory-token-{}-{}", user_id, self.next_id());
        self.tokens.insert(raw.clone(), user_id);
        AccessToken::new(raw)
    }

    fn build_quiz(&mut self, draft: &QuizDraft) -> StoredQuiz {
        let id = QuizId::new(self.next_id());
        let questions = draft
            .questions
            .iter()
            .enumerate()
            .map(|(q_index, question)| KeyedQuestion {
                id: QuestionId::new(self.next_id()),
                text: question.text.clone(),
                order: Some(question.order.unwrap_or(index_u32(q_index))),
                choices: question
                    .choices
                    .iter()
                    .enumerate()
                    .map(|(c_index, choice)| KeyedChoice {
                        id: ChoiceId::new(self.next_id()),
                        text: choice.text.clone(),
                        order: Some(choice.order.unwrap_or(index_u32(c_index))),
                        is_correct: choice.is_correct,
                    })
                    .collect(),
            })
            .collect();
        StoredQuiz {
            id,
            title: draft.title.clone(),
            questions,
        }
    }
}

fn index_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

/// Backend that lives in process memory.
///
/// Mirrors the REST backend's rules (roles, grading, error details) so
/// services and views can be exercised without a server. Tokens are checked
/// against the shared `CredentialStore`, and an unknown token clears it the
/// way the HTTP client does on a 401.
#[derive(Clone)]
pub struct InMemoryBackend {
    state: Arc<Mutex<State>>,
    credentials: Arc<dyn CredentialStore>,
    clock: Clock,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            credentials,
            clock: Clock::default(),
        }
    }

    /// Backend with its own in-memory credential store.
    #[must_use]
    pub fn standalone() -> Self {
        Self::new(Arc::new(InMemoryCredentialStore::new()))
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn credentials(&self) -> Arc<dyn CredentialStore> {
        Arc::clone(&self.credentials)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, ApiError> {
        self.state
            .lock()
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    fn authenticate(&self, state: &State) -> Result<User, ApiError> {
        let user = self
            .credentials
            .token()?
            .and_then(|token| state.tokens.get(token.expose()).copied())
            .and_then(|id| state.users.get(&id))
            .map(|stored| stored.user.clone());
        match user {
            Some(user) => Ok(user),
            None => {
                self.credentials.clear()?;
                Err(ApiError::Unauthorized)
            }
        }
    }

    fn authorize_author(&self, state: &State) -> Result<User, ApiError> {
        let user = self.authenticate(state)?;
        if user.role.can_author() {
            Ok(user)
        } else {
            Err(ApiError::Forbidden(AUTHOR_ONLY.into()))
        }
    }

    /// Create an account directly, bypassing registration rules.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the state lock is poisoned.
    pub fn add_user(&self, email: &str, password: &str, role: Role) -> Result<User, ApiError> {
        let mut state = self.lock()?;
        let id = UserId::new(state.next_id());
        let user = User {
            id,
            email: email.to_owned(),
            role,
            username: email.split('@').next().map(str::to_owned),
            firstname: None,
            lastname: None,
            picture_profile: None,
            created_at: Some(self.clock.now()),
            updated_at: None,
        };
        state.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password: password.to_owned(),
            },
        );
        Ok(user)
    }

    /// Create a user with `role`, issue a token and store it as the current
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the state lock is poisoned or the store fails.
    pub fn sign_in_as(&self, role: Role) -> Result<User, ApiError> {
        let email = format!("{}@academy.test", role.label().to_lowercase());
        let user = self.add_user(&email, "password", role)?;
        let token = self.lock()?.issue_token(user.id);
        self.credentials
            .save(&Credentials::new(token).with_user(user.clone()))?;
        Ok(user)
    }

    /// Invalidate every issued token, as if they all expired.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the state lock is poisoned.
    pub fn expire_tokens(&self) -> Result<(), ApiError> {
        self.lock()?.tokens.clear();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the state lock is poisoned or the draft is invalid.
    pub fn seed_module(&self, draft: ModuleDraft) -> Result<Module, ApiError> {
        let draft = draft
            .validate()
            .map_err(|err| ApiError::Rejected(err.to_string()))?;
        let mut state = self.lock()?;
        let module = Module {
            id: ModuleId::new(state.next_id()),
            title: draft.title,
            content: draft.content,
            kind: draft.kind,
            created_at: self.clock.now(),
            updated_at: None,
        };
        state.modules.insert(module.id, module.clone());
        Ok(module)
    }

    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown module and
    /// `ApiError::Rejected` if the draft does not form a valid quiz.
    pub fn seed_quiz(&self, module_id: ModuleId, draft: &QuizDraft) -> Result<Quiz, ApiError> {
        let mut state = self.lock()?;
        if !state.modules.contains_key(&module_id) {
            return Err(ApiError::NotFound(MODULE_NOT_FOUND.into()));
        }
        let stored = state.build_quiz(draft);
        let quiz = stored.public(module_id)?;
        state.quizzes.insert(module_id, stored);
        Ok(quiz)
    }

    /// Make the next submission fail with `error` before grading.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the state lock is poisoned.
    pub fn fail_next_submit(&self, error: ApiError) -> Result<(), ApiError> {
        self.lock()?.fail_next_submit = Some(error);
        Ok(())
    }

    /// Every accepted submission payload, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the state lock is poisoned.
    pub fn submissions(&self) -> Result<Vec<(ModuleId, Vec<Answer>)>, ApiError> {
        Ok(self.lock()?.submissions.clone())
    }

    /// How many times a quiz definition has been fetched.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the state lock is poisoned.
    pub fn quiz_fetch_count(&self) -> Result<usize, ApiError> {
        Ok(self.lock()?.quiz_fetches)
    }
}

#[async_trait]
impl QuizApi for InMemoryBackend {
    async fn fetch_quiz(&self, module_id: ModuleId) -> Result<Quiz, ApiError> {
        let mut state = self.lock()?;
        self.authenticate(&state)?;
        state.quiz_fetches += 1;
        if !state.modules.contains_key(&module_id) {
            return Err(ApiError::NotFound(QUIZ_MODULE_NOT_FOUND.into()));
        }
        state
            .quizzes
            .get(&module_id)
            .ok_or_else(|| ApiError::NotFound(QUIZ_NOT_FOUND.into()))?
            .public(module_id)
    }

    async fn submit_answers(
        &self,
        module_id: ModuleId,
        answers: &[Answer],
    ) -> Result<QuizResult, ApiError> {
        let mut state = self.lock()?;
        self.authenticate(&state)?;
        if let Some(err) = state.fail_next_submit.take() {
            debug!(%module_id, "injected submit failure");
            return Err(err);
        }
        let result = state
            .quizzes
            .get(&module_id)
            .ok_or_else(|| ApiError::NotFound(QUIZ_NOT_FOUND.into()))?
            .grade(answers)?;
        state.submissions.push((module_id, answers.to_vec()));
        Ok(result)
    }

    async fn create_quiz(&self, module_id: ModuleId, draft: &QuizDraft) -> Result<Quiz, ApiError> {
        let mut state = self.lock()?;
        self.authorize_author(&state)?;
        if !state.modules.contains_key(&module_id) {
            return Err(ApiError::NotFound(QUIZ_MODULE_NOT_FOUND.into()));
        }
        if state.quizzes.contains_key(&module_id) {
            return Err(ApiError::Rejected(
                "Un quiz existe déjà pour ce module".into(),
            ));
        }
        let stored = state.build_quiz(draft);
        let quiz = stored.public(module_id)?;
        state.quizzes.insert(module_id, stored);
        Ok(quiz)
    }

    async fn update_quiz(&self, module_id: ModuleId, draft: &QuizDraft) -> Result<Quiz, ApiError> {
        let mut state = self.lock()?;
        self.authorize_author(&state)?;
        let Some(existing) = state.quizzes.get(&module_id) else {
            return Err(ApiError::NotFound(QUIZ_NOT_FOUND.into()));
        };
        let quiz_id = existing.id;
        let mut stored = state.build_quiz(draft);
        stored.id = quiz_id;
        let quiz = stored.public(module_id)?;
        state.quizzes.insert(module_id, stored);
        Ok(quiz)
    }

    async fn delete_quiz(&self, module_id: ModuleId) -> Result<(), ApiError> {
        let mut state = self.lock()?;
        self.authorize_author(&state)?;
        state
            .quizzes
            .remove(&module_id)
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(QUIZ_NOT_FOUND.into()))
    }

    async fn answer_key(&self, module_id: ModuleId) -> Result<Vec<KeyedQuestion>, ApiError> {
        let state = self.lock()?;
        self.authorize_author(&state)?;
        state
            .quizzes
            .get(&module_id)
            .map(|stored| stored.questions.clone())
            .ok_or_else(|| ApiError::NotFound(QUIZ_NOT_FOUND.into()))
    }
}

#[async_trait]
impl ModuleApi for InMemoryBackend {
    async fn list_modules(&self, skip: u32, limit: u32) -> Result<Vec<ModuleSummary>, ApiError> {
        let state = self.lock()?;
        self.authenticate(&state)?;
        Ok(state
            .modules
            .values()
            .skip(skip as usize)
            .take(limit as usize)
            .map(|module| ModuleSummary {
                id: module.id,
                title: module.title.clone(),
                kind: module.kind,
                created_at: module.created_at,
            })
            .collect())
    }

    async fn get_module(&self, id: ModuleId) -> Result<Module, ApiError> {
        let state = self.lock()?;
        self.authenticate(&state)?;
        state
            .modules
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(MODULE_NOT_FOUND.into()))
    }

    async fn create_module(&self, draft: &ModuleDraft) -> Result<Module, ApiError> {
        {
            let state = self.lock()?;
            self.authorize_author(&state)?;
        }
        self.seed_module(draft.clone())
    }

    async fn update_module(&self, id: ModuleId, patch: &ModulePatch) -> Result<Module, ApiError> {
        let mut state = self.lock()?;
        self.authorize_author(&state)?;
        let now = self.clock.now();
        let module = state
            .modules
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(MODULE_NOT_FOUND.into()))?;
        if let Some(title) = &patch.title {
            module.title.clone_from(title);
        }
        if let Some(content) = &patch.content {
            module.content.clone_from(content);
        }
        if let Some(kind) = patch.kind {
            module.kind = kind;
        }
        module.updated_at = Some(now);
        Ok(module.clone())
    }

    async fn delete_module(&self, id: ModuleId) -> Result<(), ApiError> {
        let mut state = self.lock()?;
        self.authorize_author(&state)?;
        state
            .modules
            .remove(&id)
            .ok_or_else(|| ApiError::NotFound(MODULE_NOT_FOUND.into()))?;
        state.quizzes.remove(&id);
        Ok(())
    }

    async fn module_stats(&self) -> Result<ModuleStats, ApiError> {
        let state = self.lock()?;
        self.authenticate(&state)?;
        Ok(ModuleStats {
            total_modules: state.modules.len() as u64,
        })
    }
}

#[async_trait]
impl AuthApi for InMemoryBackend {
    async fn login(&self, request: &LoginRequest) -> Result<AccessToken, ApiError> {
        let mut state = self.lock()?;
        let user_id = state
            .users
            .values()
            .find(|stored| {
                (stored.user.email == request.username
                    || stored.user.username.as_deref() == Some(request.username.as_str()))
                    && stored.password == request.password
            })
            .map(|stored| stored.user.id)
            .ok_or(ApiError::Unauthorized)?;
        Ok(state.issue_token(user_id))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let mut state = self.lock()?;
        if state.users.values().any(|s| s.user.email == request.email) {
            return Err(ApiError::Rejected("Email already registered".into()));
        }
        if let Some(username) = &request.username {
            if state
                .users
                .values()
                .any(|s| s.user.username.as_ref() == Some(username))
            {
                return Err(ApiError::Rejected("Username already taken".into()));
            }
        }
        let id = UserId::new(state.next_id());
        let user = User {
            id,
            email: request.email.clone(),
            role: Role::Student,
            username: request.username.clone(),
            firstname: request.firstname.clone(),
            lastname: request.lastname.clone(),
            picture_profile: request.picture_profile.clone(),
            created_at: Some(self.clock.now()),
            updated_at: None,
        };
        state.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password: request.password.clone(),
            },
        );
        Ok(user)
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        let state = self.lock()?;
        self.authenticate(&state)
    }

    async fn update_profile(&self, patch: &ProfilePatch) -> Result<User, ApiError> {
        let mut state = self.lock()?;
        let current = self.authenticate(&state)?;
        if let Some(username) = &patch.username {
            let taken = state.users.values().any(|s| {
                s.user.id != current.id && s.user.username.as_ref() == Some(username)
            });
            if taken {
                return Err(ApiError::Rejected("Username already taken".into()));
            }
        }
        let now = self.clock.now();
        let stored = state
            .users
            .get_mut(&current.id)
            .ok_or(ApiError::Unauthorized)?;
        let user = &mut stored.user;
        if let Some(username) = &patch.username {
            user.username = Some(username.clone());
        }
        if let Some(email) = &patch.email {
            user.email.clone_from(email);
        }
        if let Some(firstname) = &patch.firstname {
            user.firstname = Some(firstname.clone());
        }
        if let Some(lastname) = &patch.lastname {
            user.lastname = Some(lastname.clone());
        }
        if let Some(picture) = &patch.picture_profile {
            user.picture_profile = Some(picture.clone());
        }
        user.updated_at = Some(now);
        Ok(user.clone())
    }

    async fn user_profile(&self, id: UserId) -> Result<UserPublic, ApiError> {
        let state = self.lock()?;
        let stored = state
            .users
            .get(&id)
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
        let user = &stored.user;
        Ok(UserPublic {
            id: user.id,
            role: user.role,
            username: user.username.clone(),
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            picture_profile: user.picture_profile.clone(),
        })
    }
}

#[async_trait]
impl CatalogApi for InMemoryBackend {
    async fn courses(&self) -> Result<Vec<Course>, ApiError> {
        Ok(vec![
            Course {
                id: CourseId::new(1),
                title: "Introduction à Python".into(),
                level: CourseLevel::Beginner,
                description: None,
            },
            Course {
                id: CourseId::new(2),
                title: "Développement Web avec FastAPI".into(),
                level: CourseLevel::Intermediate,
                description: None,
            },
        ])
    }

    async fn health(&self) -> Result<Health, ApiError> {
        Ok(Health {
            status: "ok".into(),
        })
    }
}
