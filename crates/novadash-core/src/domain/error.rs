use std::time::Duration;

use novadash_semaphore::SemaphoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Template '{name}' not found. Available templates: {}", available.join(", "))]
    TemplateNotFound {
        name: String,
        available: Vec<String>,
    },

    /// The run may still finish server-side; check again later
    #[error("Task {task_id} still running after {elapsed:?}, status unknown")]
    PollTimeout { task_id: i64, elapsed: Duration },

    #[error("Waiting for task {task_id} cancelled after {elapsed:?}")]
    Cancelled { task_id: i64, elapsed: Duration },

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Semaphore(#[from] SemaphoreError),
}

impl DeployError {
    /// Names the caller can offer instead, when template resolution failed
    pub fn available_templates(&self) -> Option<&[String]> {
        match self {
            DeployError::TemplateNotFound { available, .. } => Some(available),
            _ => None,
        }
    }

    pub fn is_still_running(&self) -> bool {
        matches!(self, DeployError::PollTimeout { .. })
    }
}

pub type DeployResult<T> = Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_not_found_lists_alternatives() {
        let err = DeployError::TemplateNotFound {
            name: "Deploy Nonexistent".to_string(),
            available: vec!["Deploy Minimal Profile".to_string(), "Backup".to_string()],
        };

        assert_eq!(
            err.to_string(),
            "Template 'Deploy Nonexistent' not found. Available templates: Deploy Minimal Profile, Backup"
        );
        assert_eq!(err.available_templates().map(|names| names.len()), Some(2));
    }

    #[test]
    fn test_semaphore_errors_pass_through() {
        let err: DeployError = SemaphoreError::Unauthorized.into();
        assert_eq!(err.to_string(), SemaphoreError::Unauthorized.to_string());
        assert!(err.available_templates().is_none());
        assert!(!err.is_still_running());
    }
}
