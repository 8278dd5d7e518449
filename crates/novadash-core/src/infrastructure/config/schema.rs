use std::time::Duration;

use novadash_semaphore::{
    ClientConfig,
    SemaphoreResult,
};
use serde::{
    Deserialize,
    Serialize,
};

use super::validation::{
    ConfigError,
    ValidationResult,
};

pub(super) const DEFAULT_SEMAPHORE_URL: &str = "http://localhost:3000";

pub(super) const DEFAULT_PROJECT_ID: i64 = 1;

pub(super) const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub(super) const DEFAULT_MAX_RETRIES: usize = 2;

pub(super) const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

pub(super) const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 600;

pub(super) const DEFAULT_HEALTH_WINDOW: usize = 10;

pub(super) const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

pub(super) const DEFAULT_CORS_ALLOW_ALL: bool = true;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NovadashConfig {
    #[serde(default)]
    pub semaphore: SemaphoreSettings,

    #[serde(default)]
    pub server: ServerConfig,
}

impl NovadashConfig {
    /// Checks every field and reports all problems at once
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        let semaphore = &self.semaphore;

        if let Err(e) = novadash_semaphore::normalize_base_url(&semaphore.url) {
            result.add_error(ConfigError::new("semaphore.url", e.to_string()));
        }

        if semaphore.api_token.trim().is_empty() {
            result.add_error(ConfigError::new(
                "semaphore.api_token",
                "Semaphore API token is required",
            ));
        }

        if semaphore.project_id <= 0 {
            result.add_error(ConfigError::new(
                "semaphore.project_id",
                format!("must be positive, got {}", semaphore.project_id),
            ));
        }

        if semaphore.timeout_secs == 0 {
            result.add_error(ConfigError::new(
                "semaphore.timeout_secs",
                "must be greater than zero",
            ));
        }

        if semaphore.poll_interval_secs == 0 {
            result.add_error(ConfigError::new(
                "semaphore.poll_interval_secs",
                "must be greater than zero",
            ));
        }

        if semaphore.health_window == 0 {
            result.add_error(ConfigError::new(
                "semaphore.health_window",
                "must be greater than zero",
            ));
        }

        result
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemaphoreSettings {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default)]
    pub api_token: String,

    #[serde(default = "default_project_id")]
    pub project_id: i64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry budget; a request makes at most `max_retries + 1` attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    #[serde(default = "default_health_window")]
    pub health_window: usize,
}

impl Default for SemaphoreSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_token: String::new(),
            project_id: default_project_id(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            poll_interval_secs: default_poll_interval_secs(),
            wait_timeout_secs: default_wait_timeout_secs(),
            health_window: default_health_window(),
        }
    }
}

impl SemaphoreSettings {
    pub fn client_config(&self) -> SemaphoreResult<ClientConfig> {
        Ok(ClientConfig::new(&self.url, self.api_token.as_str())?
            .with_timeout(self.timeout())
            .with_max_retries(self.max_retries))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

fn default_url() -> String {
    DEFAULT_SEMAPHORE_URL.to_string()
}

fn default_project_id() -> i64 {
    DEFAULT_PROJECT_ID
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> usize {
    DEFAULT_MAX_RETRIES
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_wait_timeout_secs() -> u64 {
    DEFAULT_WAIT_TIMEOUT_SECS
}

fn default_health_window() -> usize {
    DEFAULT_HEALTH_WINDOW
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_cors_allow_all")]
    pub cors_allow_all: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors_allow_all: default_cors_allow_all(),
        }
    }
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_cors_allow_all() -> bool {
    DEFAULT_CORS_ALLOW_ALL
}
