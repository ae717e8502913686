use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use academy_core::model::User;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// Opaque bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// What survives a restart: the token and the user it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: AccessToken,
    #[serde(default)]
    pub user: Option<User>,
}

impl Credentials {
    #[must_use]
    pub fn new(token: AccessToken) -> Self {
        Self { token, user: None }
    }

    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }
}

/// Persistent slot for the signed-in credentials.
pub trait CredentialStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError::Credentials` if stored data cannot be read.
    fn load(&self) -> Result<Option<Credentials>, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::Credentials` if the data cannot be written.
    fn save(&self, credentials: &Credentials) -> Result<(), ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::Credentials` if stored data cannot be removed.
    fn clear(&self) -> Result<(), ApiError>;

    /// Token only, for attaching to requests.
    ///
    /// # Errors
    ///
    /// See [`CredentialStore::load`].
    fn token(&self) -> Result<Option<AccessToken>, ApiError> {
        Ok(self.load()?.map(|credentials| credentials.token))
    }
}

fn lock_err(err: impl fmt::Display) -> ApiError {
    ApiError::Credentials(err.to_string())
}

/// JSON file on disk, read once and cached.
#[derive(Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    cache: Arc<Mutex<Option<Option<Credentials>>>>,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<Option<Credentials>, ApiError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|err| ApiError::Credentials(format!("{}: {err}", self.path.display()))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ApiError::Credentials(format!(
                "{}: {err}",
                self.path.display()
            ))),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, ApiError> {
        let mut cache = self.cache.lock().map_err(lock_err)?;
        if let Some(cached) = cache.as_ref() {
            return Ok(cached.clone());
        }
        let loaded = self.read_file()?;
        debug!(path = %self.path.display(), found = loaded.is_some(), "loaded credentials");
        *cache = Some(loaded.clone());
        Ok(loaded)
    }

    fn save(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let mut cache = self.cache.lock().map_err(lock_err)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(lock_err)?;
        }
        let raw = serde_json::to_string_pretty(credentials)
            .map_err(|err| ApiError::Credentials(err.to_string()))?;
        fs::write(&self.path, raw).map_err(lock_err)?;
        *cache = Some(Some(credentials.clone()));
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        let mut cache = self.cache.lock().map_err(lock_err)?;
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(lock_err(err)),
        }
        *cache = Some(None);
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    slot: Arc<Mutex<Option<Credentials>>>,
}

impl InMemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(credentials: Credentials) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(credentials))),
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, ApiError> {
        Ok(self.slot.lock().map_err(lock_err)?.clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), ApiError> {
        *self.slot.lock().map_err(lock_err)? = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        *self.slot.lock().map_err(lock_err)? = None;
        Ok(())
    }
}
