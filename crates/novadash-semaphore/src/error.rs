use std::time::Duration;

use thiserror::Error;

/// Errors raised by the Semaphore transport and resource accessors
#[derive(Error, Debug)]
pub enum SemaphoreError {
    #[error("Unauthorized: invalid or expired API token")]
    Unauthorized,

    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("Server error (HTTP {status}) after {attempts} attempt(s): {body}")]
    ServerError {
        status: u16,
        body: String,
        attempts: usize,
    },

    #[error("Request timeout after {attempts} attempt(s): {cause}")]
    Timeout { cause: String, attempts: usize },

    #[error("Connection error: cannot reach Semaphore after {attempts} attempt(s): {cause}")]
    ConnectionError { cause: String, attempts: usize },

    #[error("API error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Log stream for task {task_id} cancelled after {elapsed:?}")]
    Cancelled { task_id: i64, elapsed: Duration },

    #[error("Log stream for task {task_id} timed out after {elapsed:?}, task still running")]
    StreamTimeout { task_id: i64, elapsed: Duration },
}

impl SemaphoreError {
    /// Whether the transport should try the request again
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            SemaphoreError::ServerError { .. }
                | SemaphoreError::Timeout { .. }
                | SemaphoreError::ConnectionError { .. }
        )
    }

    pub(crate) fn with_attempts(self, total: usize) -> Self {
        match self {
            SemaphoreError::ServerError { status, body, .. } => SemaphoreError::ServerError {
                status,
                body,
                attempts: total,
            },
            SemaphoreError::Timeout { cause, .. } => SemaphoreError::Timeout {
                cause,
                attempts: total,
            },
            SemaphoreError::ConnectionError { cause, .. } => SemaphoreError::ConnectionError {
                cause,
                attempts: total,
            },
            other => other,
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SemaphoreError::Timeout {
                cause: err.to_string(),
                attempts: 1,
            }
        } else {
            SemaphoreError::ConnectionError {
                cause: err.to_string(),
                attempts: 1,
            }
        }
    }
}

pub type SemaphoreResult<T> = Result<T, SemaphoreError>;

impl From<serde_json::Error> for SemaphoreError {
    fn from(err: serde_json::Error) -> Self {
        SemaphoreError::Serialization(err.to_string())
    }
}
