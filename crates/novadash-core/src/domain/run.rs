use chrono::{
    DateTime,
    Utc,
};
use novadash_semaphore::{
    Task,
    TaskStatus,
};
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub dry_run: bool,
}

/// A freshly started run of a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunHandle {
    pub task_id: i64,
    pub project_id: i64,
    pub template_id: i64,
    pub template_name: String,
    pub status: TaskStatus,
    pub url: String,
}

/// Derived, display-ready view of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub task_id: i64,
    pub template_id: i64,
    pub status: TaskStatus,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub duration_seconds: Option<f64>,
    pub message: String,
    pub is_running: bool,
    pub is_success: bool,
    pub is_failed: bool,
    pub is_stopped: bool,
    pub is_terminal: bool,
}

impl RunSummary {
    pub fn from_task(task: &Task) -> Self {
        let duration_seconds = match (task.start, task.end) {
            (Some(start), Some(end)) if end >= start => {
                Some((end - start).num_milliseconds() as f64 / 1000.0)
            }
            _ => None,
        };

        Self {
            task_id: task.id,
            template_id: task.template_id,
            status: task.status,
            start: task.start,
            end: task.end,
            duration_seconds,
            message: task.message.clone(),
            is_running: task.status == TaskStatus::Running,
            is_success: task.status == TaskStatus::Success,
            is_failed: task.status == TaskStatus::Error,
            is_stopped: task.status == TaskStatus::Stopped,
            is_terminal: task.status.is_terminal(),
        }
    }
}

impl From<&Task> for RunSummary {
    fn from(task: &Task) -> Self {
        Self::from_task(task)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn task(status: TaskStatus) -> Task {
        Task {
            id: 42,
            project_id: 1,
            template_id: 5,
            status,
            start: None,
            end: None,
            message: "Deploy".to_string(),
            debug: false,
            dry_run: false,
            created: None,
        }
    }

    #[test]
    fn test_summary_of_finished_run() {
        let mut finished = task(TaskStatus::Success);
        finished.start = Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
        finished.end = Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 2, 30).unwrap());

        let summary = RunSummary::from_task(&finished);

        assert_eq!(summary.task_id, 42);
        assert_eq!(summary.duration_seconds, Some(150.0));
        assert!(summary.is_success);
        assert!(summary.is_terminal);
        assert!(!summary.is_running);
        assert!(!summary.is_failed);
        assert_eq!(summary.message, "Deploy");
    }

    #[test]
    fn test_running_run_has_no_duration() {
        let mut running = task(TaskStatus::Running);
        running.start = Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());

        let summary = RunSummary::from_task(&running);

        assert_eq!(summary.duration_seconds, None);
        assert!(summary.is_running);
        assert!(!summary.is_terminal);
    }

    #[test]
    fn test_end_before_start_has_no_duration() {
        let mut skewed = task(TaskStatus::Error);
        skewed.start = Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 5).unwrap());
        skewed.end = Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());

        let summary = RunSummary::from_task(&skewed);

        assert_eq!(summary.duration_seconds, None);
        assert!(summary.is_failed);
    }

    #[test]
    fn test_flags_follow_status() {
        let stopped = RunSummary::from_task(&task(TaskStatus::Stopped));
        assert!(stopped.is_stopped && stopped.is_terminal && !stopped.is_failed);

        let queued = RunSummary::from_task(&task(TaskStatus::Queued));
        assert!(!queued.is_running && !queued.is_terminal);

        let unknown = RunSummary::from_task(&task(TaskStatus::Unknown));
        assert!(!unknown.is_terminal);
    }
}
