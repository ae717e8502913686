use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, instrument, warn};

use academy_core::model::{
    LoginRequest, ProfilePatch, RegisterRequest, Role, User, UserId, UserPublic,
};
use api::{ApiError, AuthApi, CredentialStore, Credentials};

use crate::error::AuthError;

/// Where the signed-in session stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Persisted credentials have not been checked yet.
    Initializing,
    SignedOut,
    /// The backend rejected the token of a running session.
    Expired,
    SignedIn(User),
}

impl AuthState {
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

/// Outcome of checking a protected route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth is still initializing; show a spinner.
    Pending,
    RedirectLanding,
    /// The session expired; the user has to sign in again.
    RedirectLogin,
    /// Signed in, but the role is not allowed here.
    RedirectDashboard,
    Allow,
}

/// Decide whether a route guarded by `required_roles` may render.
/// An empty `required_roles` admits any signed-in user.
#[must_use]
pub fn guard(state: &AuthState, required_roles: &[Role]) -> GuardDecision {
    match state {
        AuthState::Initializing => GuardDecision::Pending,
        AuthState::SignedOut => GuardDecision::RedirectLanding,
        AuthState::Expired => GuardDecision::RedirectLogin,
        AuthState::SignedIn(user) => {
            if required_roles.is_empty() || required_roles.contains(&user.role) {
                GuardDecision::Allow
            } else {
                GuardDecision::RedirectDashboard
            }
        }
    }
}

/// Signed-in session: persisted credentials plus the cached current user.
///
/// Reads the credential store once in `init` and clears it on logout or when
/// the backend rejects the token.
#[derive(Clone)]
pub struct AuthService {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn CredentialStore>,
    state: Arc<Mutex<AuthState>>,
}

impl AuthService {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            api,
            store,
            state: Arc::new(Mutex::new(AuthState::Initializing)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, AuthState>, AuthError> {
        self.state
            .lock()
            .map_err(|e| AuthError::State(e.to_string()))
    }

    fn set_state(&self, next: AuthState) -> Result<AuthState, AuthError> {
        let mut guard = self.lock()?;
        *guard = next.clone();
        Ok(next)
    }

    /// Restore the session from persisted credentials and confirm the token
    /// with the backend. Any failure signs out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` only when the credential store itself fails.
    #[instrument(skip(self))]
    pub async fn init(&self) -> Result<AuthState, AuthError> {
        let Some(credentials) = self.store.load()? else {
            debug!("no stored credentials");
            return self.set_state(AuthState::SignedOut);
        };
        match self.api.current_user().await {
            Ok(user) => {
                self.store.save(&credentials.with_user(user.clone()))?;
                info!(user_id = %user.id, role = ?user.role, "session restored");
                self.set_state(AuthState::SignedIn(user))
            }
            Err(err) => {
                warn!(error = %err, "stored session is not usable; signing out");
                self.store.clear()?;
                self.set_state(AuthState::SignedOut)
            }
        }
    }

    /// Sign in with a username or email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong login, `AuthError::User`
    /// for blank fields, or `AuthError::Api` for other failures.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username_or_email: &str, password: &str) -> Result<User, AuthError> {
        let request = LoginRequest::new(username_or_email, password)?;
        let token = self.api.login(&request).await.map_err(|err| match err {
            ApiError::Unauthorized => AuthError::InvalidCredentials,
            other => AuthError::Api(other),
        })?;
        self.store.save(&Credentials::new(token.clone()))?;

        let user = match self.api.current_user().await {
            Ok(user) => user,
            Err(err) => {
                self.store.clear()?;
                self.set_state(AuthState::SignedOut)?;
                return Err(err.into());
            }
        };
        self.store
            .save(&Credentials::new(token).with_user(user.clone()))?;
        info!(user_id = %user.id, role = ?user.role, "signed in");
        self.set_state(AuthState::SignedIn(user.clone()))?;
        Ok(user)
    }

    /// Create an account, then sign in with it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::User` for invalid input or `AuthError::Api` when the
    /// backend rejects the registration.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        let request = request.validate()?;
        let created = self.api.register(&request).await?;
        debug!(user_id = %created.id, "account created");
        self.login(&request.email, &request.password).await
    }

    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` without a session, or `AuthError::Api`.
    #[instrument(skip(self, patch))]
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<User, AuthError> {
        let Some(credentials) = self.store.load()? else {
            return Err(AuthError::NotSignedIn);
        };
        let user = match self.api.update_profile(patch).await {
            Ok(user) => user,
            Err(err) => return Err(self.absorb(err)?),
        };
        self.store.save(&credentials.with_user(user.clone()))?;
        self.set_state(AuthState::SignedIn(user.clone()))?;
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `AuthError::Api` when the profile cannot be fetched.
    pub async fn user_profile(&self, id: UserId) -> Result<UserPublic, AuthError> {
        Ok(self.api.user_profile(id).await?)
    }

    /// Forget the session locally. The state is signed out even when the
    /// credential store fails.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the credential store cannot be cleared.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.set_state(AuthState::SignedOut)?;
        info!("signed out");
        self.store.clear()?;
        Ok(())
    }

    /// React to an error from any API call: a rejected token expires the
    /// session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the state cannot be updated or the credential
    /// store cannot be cleared. The session is expired in both cases.
    pub fn absorb(&self, err: ApiError) -> Result<AuthError, AuthError> {
        if err.is_unauthorized() {
            self.set_state(AuthState::Expired)?;
            warn!("session token rejected; sign-in required");
            self.store.clear()?;
        }
        Ok(AuthError::Api(err))
    }

    /// Snapshot of the current state.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::State` if the state lock is poisoned.
    pub fn state(&self) -> Result<AuthState, AuthError> {
        Ok(self.lock()?.clone())
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state().ok().and_then(|state| state.user().cloned())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}
