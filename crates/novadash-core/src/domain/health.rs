use serde::{
    Deserialize,
    Serialize,
};

use super::run::RunSummary;

/// Rollup of a recent-run window, recomputed on every request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub total: usize,
    pub running: usize,
    pub success: usize,
    pub failed: usize,
    pub latest: Option<RunSummary>,
    pub healthy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthSummary {
    /// `runs` are most-recent-first
    pub fn from_runs(runs: &[RunSummary]) -> Self {
        let running = runs.iter().filter(|run| run.is_running).count();
        let success = runs.iter().filter(|run| run.is_success).count();
        let failed = runs.iter().filter(|run| run.is_failed).count();

        Self {
            total: runs.len(),
            running,
            success,
            failed,
            latest: runs.first().cloned(),
            healthy: failed == 0 && running <= 1,
            error: None,
        }
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use novadash_semaphore::{
        Task,
        TaskStatus,
    };

    use super::*;

    fn runs(statuses: &[TaskStatus]) -> Vec<RunSummary> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                RunSummary::from_task(&Task {
                    id: 100 - i as i64,
                    project_id: 1,
                    template_id: 5,
                    status: *status,
                    start: None,
                    end: None,
                    message: String::new(),
                    debug: false,
                    dry_run: false,
                    created: None,
                })
            })
            .collect()
    }

    #[test]
    fn test_failures_make_window_unhealthy() {
        let mut statuses = vec![TaskStatus::Running];
        statuses.extend([TaskStatus::Success; 7]);
        statuses.extend([TaskStatus::Error; 2]);

        let summary = HealthSummary::from_runs(&runs(&statuses));

        assert_eq!(summary.total, 10);
        assert_eq!(summary.success, 7);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.running, 1);
        assert!(!summary.healthy);
        assert_eq!(summary.latest.as_ref().map(|run| run.task_id), Some(100));
    }

    #[test]
    fn test_single_running_run_is_healthy() {
        let summary = HealthSummary::from_runs(&runs(&[
            TaskStatus::Running,
            TaskStatus::Success,
            TaskStatus::Stopped,
        ]));

        assert!(summary.healthy);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_two_running_runs_are_unhealthy() {
        let summary = HealthSummary::from_runs(&runs(&[TaskStatus::Running, TaskStatus::Running]));
        assert!(!summary.healthy);
    }

    #[test]
    fn test_empty_window_is_healthy() {
        let summary = HealthSummary::from_runs(&[]);
        assert!(summary.healthy);
        assert!(summary.latest.is_none());
    }

    #[test]
    fn test_degraded_summary() {
        let summary = HealthSummary::degraded("Connection error");
        assert!(!summary.healthy);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.error.as_deref(), Some("Connection error"));
    }
}
