use std::time::Duration;

use secrecy::{
    ExposeSecret,
    SecretString,
};

use crate::retry::RetryPolicy;
use crate::{
    SemaphoreError,
    SemaphoreResult,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Immutable connection settings for one Semaphore client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    token: SecretString,
    timeout: Duration,
    ping_timeout: Duration,
    retry_policy: RetryPolicy,
}

impl ClientConfig {
    pub fn new(base_url: &str, token: impl Into<String>) -> SemaphoreResult<Self> {
        let base_url = normalize_base_url(base_url)?;
        let token: String = token.into();
        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(SemaphoreError::InvalidConfig(
                "Semaphore API token is empty".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            token: SecretString::from(token),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            ping_timeout: DEFAULT_PING_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.retry_policy.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_policy.base_delay = delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_url(&self) -> String {
        format!("{}/api", self.base_url)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn ping_timeout(&self) -> Duration {
        self.ping_timeout
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    pub(crate) fn auth_header(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

/// Trims whitespace, trailing slashes and a trailing `/api` segment
pub fn normalize_base_url(raw: &str) -> SemaphoreResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix("/api").unwrap_or(trimmed);
    let trimmed = trimmed.trim_end_matches('/');

    // "https://" alone has already lost its slashes here and fails the check
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(SemaphoreError::InvalidConfig(format!(
            "Semaphore URL must start with http:// or https://, got '{}'",
            raw
        )));
    }

    Ok(trimmed.to_string())
}
