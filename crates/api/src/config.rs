use std::env;
use std::time::Duration;

use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the backend lives and how long to wait for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    timeout: Duration,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `url::ParseError` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, url::ParseError> {
        // Relative joins replace the last path segment unless the base ends in '/'.
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, timeout })
    }

    /// Reads `ACADEMY_API_URL` and `ACADEMY_API_TIMEOUT_SECS`. A missing or
    /// unparsable timeout falls back to the default.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if `ACADEMY_API_URL` is set but invalid.
    pub fn from_env() -> Result<Self, url::ParseError> {
        let timeout = env::var("ACADEMY_API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
        let base_url = env::var("ACADEMY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        Self::new(&base_url, timeout)
    }

    /// Backend on `localhost:8000` with the default timeout.
    ///
    /// # Errors
    ///
    /// See [`ApiConfig::new`].
    pub fn local() -> Result<Self, url::ParseError> {
        Self::new(DEFAULT_API_URL, DEFAULT_TIMEOUT)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve a path relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let config = ApiConfig::new("https://school.example.com/backend", DEFAULT_TIMEOUT).unwrap();
        let url = config.endpoint("/api/modules/3/quiz").unwrap();
        assert_eq!(url.as_str(), "https://school.example.com/backend/api/modules/3/quiz");
    }

    #[test]
    fn default_points_at_local_backend() {
        let config = ApiConfig::local().unwrap();
        assert_eq!(config.endpoint("health").unwrap().as_str(), "http://localhost:8000/health");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn relative_base_is_rejected() {
        assert!(ApiConfig::new("localhost", DEFAULT_TIMEOUT).is_err());
    }
}
