use std::sync::Arc;

use academy_core::model::{
    Answer, Course, Health, KeyedQuestion, LoginRequest, Module, ModuleDraft, ModuleId,
    ModulePatch, ModuleStats, ModuleSummary, ProfilePatch, Quiz, QuizDraft, QuizResult,
    RegisterRequest, User, UserId, UserPublic,
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::contract::{AuthApi, CatalogApi, ModuleApi, QuizApi};
use crate::credentials::{AccessToken, CredentialStore};
use crate::error::ApiError;
use crate::wire::{
    CoursesDto, KeyedQuestionDto, QuizDto, QuizResultDto, SubmissionDto, TokenDto,
};

/// REST client for the academy backend.
///
/// Every request carries the stored bearer token when there is one. A 401
/// from any endpoint clears the stored credentials before the error is
/// returned.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    config: ApiConfig,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpApi {
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.config
            .endpoint(path)
            .map_err(|err| ApiError::Network(format!("invalid endpoint {path}: {err}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let builder = self.client.request(method, self.url(path)?);
        Ok(match self.credentials.token()? {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.checked(builder.send().await?, true).await?;
        Ok(response.json::<T>().await?)
    }

    /// For endpoints that take no token; a 401 there is not a session expiry.
    async fn send_public<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.checked(builder.send().await?, false).await?;
        Ok(response.json::<T>().await?)
    }

    async fn checked(&self, response: Response, authenticated: bool) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), &body);
        if authenticated && err.is_unauthorized() {
            warn!(url = %self.config.base_url(), "backend rejected token; clearing credentials");
            self.credentials.clear()?;
        } else {
            debug!(status = status.as_u16(), error = %err, "request failed");
        }
        Err(err)
    }
}

fn quiz_path(module_id: ModuleId) -> String {
    format!("api/modules/{module_id}/quiz")
}

#[async_trait]
impl QuizApi for HttpApi {
    #[instrument(skip(self))]
    async fn fetch_quiz(&self, module_id: ModuleId) -> Result<Quiz, ApiError> {
        let dto: QuizDto = self.send(self.request(Method::GET, &quiz_path(module_id))?).await?;
        Quiz::try_from(dto).map_err(|err| ApiError::Decode(err.to_string()))
    }

    #[instrument(skip(self, answers), fields(answered = answers.len()))]
    async fn submit_answers(
        &self,
        module_id: ModuleId,
        answers: &[Answer],
    ) -> Result<QuizResult, ApiError> {
        let path = format!("{}/submit", quiz_path(module_id));
        let body = SubmissionDto::from_answers(answers);
        let dto: QuizResultDto = self
            .send(self.request(Method::POST, &path)?.json(&body))
            .await?;
        QuizResult::try_from(dto).map_err(|err| ApiError::Decode(err.to_string()))
    }

    #[instrument(skip(self, draft))]
    async fn create_quiz(&self, module_id: ModuleId, draft: &QuizDraft) -> Result<Quiz, ApiError> {
        let dto: QuizDto = self
            .send(self.request(Method::POST, &quiz_path(module_id))?.json(draft))
            .await?;
        Quiz::try_from(dto).map_err(|err| ApiError::Decode(err.to_string()))
    }

    #[instrument(skip(self, draft))]
    async fn update_quiz(&self, module_id: ModuleId, draft: &QuizDraft) -> Result<Quiz, ApiError> {
        let dto: QuizDto = self
            .send(self.request(Method::PUT, &quiz_path(module_id))?.json(draft))
            .await?;
        Quiz::try_from(dto).map_err(|err| ApiError::Decode(err.to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_quiz(&self, module_id: ModuleId) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .send(self.request(Method::DELETE, &quiz_path(module_id))?)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn answer_key(&self, module_id: ModuleId) -> Result<Vec<KeyedQuestion>, ApiError> {
        let path = format!("{}/answers", quiz_path(module_id));
        let dtos: Vec<KeyedQuestionDto> = self.send(self.request(Method::GET, &path)?).await?;
        Ok(dtos.into_iter().map(KeyedQuestion::from).collect())
    }
}

#[async_trait]
impl ModuleApi for HttpApi {
    #[instrument(skip(self))]
    async fn list_modules(&self, skip: u32, limit: u32) -> Result<Vec<ModuleSummary>, ApiError> {
        let builder = self
            .request(Method::GET, "api/modules/")?
            .query(&[("skip", skip), ("limit", limit)]);
        self.send(builder).await
    }

    #[instrument(skip(self))]
    async fn get_module(&self, id: ModuleId) -> Result<Module, ApiError> {
        self.send(self.request(Method::GET, &format!("api/modules/{id}"))?)
            .await
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    async fn create_module(&self, draft: &ModuleDraft) -> Result<Module, ApiError> {
        self.send(self.request(Method::POST, "api/modules/")?.json(draft))
            .await
    }

    #[instrument(skip(self, patch))]
    async fn update_module(&self, id: ModuleId, patch: &ModulePatch) -> Result<Module, ApiError> {
        self.send(
            self.request(Method::PUT, &format!("api/modules/{id}"))?
                .json(patch),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_module(&self, id: ModuleId) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .send(self.request(Method::DELETE, &format!("api/modules/{id}"))?)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn module_stats(&self) -> Result<ModuleStats, ApiError> {
        self.send(self.request(Method::GET, "api/modules/stats/count")?)
            .await
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    #[instrument(skip(self, request), fields(username = %request.username))]
    async fn login(&self, request: &LoginRequest) -> Result<AccessToken, ApiError> {
        let form = [
            ("username", request.username.as_str()),
            ("password", request.password.as_str()),
        ];
        let builder = self
            .client
            .post(self.url("api/auth/login")?)
            .form(&form);
        let token: TokenDto = self.send_public(builder).await?;
        Ok(AccessToken::new(token.access_token))
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let builder = self.client.post(self.url("api/auth/register")?).json(request);
        self.send_public(builder).await
    }

    #[instrument(skip(self))]
    async fn current_user(&self) -> Result<User, ApiError> {
        self.send(self.request(Method::GET, "api/auth/me")?).await
    }

    #[instrument(skip(self, patch))]
    async fn update_profile(&self, patch: &ProfilePatch) -> Result<User, ApiError> {
        self.send(self.request(Method::PUT, "api/auth/me")?.json(patch))
            .await
    }

    #[instrument(skip(self))]
    async fn user_profile(&self, id: UserId) -> Result<UserPublic, ApiError> {
        self.send(self.request(Method::GET, &format!("api/auth/users/{id}"))?)
            .await
    }
}

#[async_trait]
impl CatalogApi for HttpApi {
    #[instrument(skip(self))]
    async fn courses(&self) -> Result<Vec<Course>, ApiError> {
        let dto: CoursesDto = self.send(self.request(Method::GET, "api/courses")?).await?;
        Ok(dto.courses)
    }

    #[instrument(skip(self))]
    async fn health(&self) -> Result<Health, ApiError> {
        self.send_public(self.client.get(self.url("health")?)).await
    }
}
