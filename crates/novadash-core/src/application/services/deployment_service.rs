use std::sync::Arc;
use std::time::Duration;

use novadash_semaphore::{
    stream_task_logs,
    LogStreamOptions,
    SemaphoreApi,
    Task,
    TaskLogStream,
    Template,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{
    debug,
    info,
};

use crate::domain::{
    DeployError,
    DeployResult,
    RunHandle,
    RunOptions,
    RunSummary,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Starts template runs and follows them to completion
///
/// Holds no per-call state; concurrent calls are independent.
pub struct DeploymentService {
    api: Arc<dyn SemaphoreApi>,
    poll_interval: Duration,
    wait_timeout: Duration,
}

impl DeploymentService {
    pub fn new(api: Arc<dyn SemaphoreApi>) -> Self {
        Self {
            api,
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    pub async fn list_templates(&self, project_id: i64) -> DeployResult<Vec<Template>> {
        Ok(self.api.get_templates(project_id).await?)
    }

    /// Finds the first template whose name matches exactly (case-sensitive)
    pub async fn resolve_template(&self, project_id: i64, name: &str) -> DeployResult<Template> {
        let mut templates = self.api.get_templates(project_id).await?;

        if let Some(index) = templates.iter().position(|t| t.name == name) {
            return Ok(templates.swap_remove(index));
        }

        Err(DeployError::TemplateNotFound {
            name: name.to_string(),
            available: templates.into_iter().map(|t| t.name).collect(),
        })
    }

    pub async fn resolve_and_run(&self, project_id: i64, template_name: &str) -> DeployResult<RunHandle> {
        self.resolve_and_run_with(project_id, template_name, RunOptions::default())
            .await
    }

    /// Resolves `template_name` and starts a run of it
    ///
    /// Two separate calls; a template renamed in between is not retried.
    pub async fn resolve_and_run_with(
        &self, project_id: i64, template_name: &str, options: RunOptions,
    ) -> DeployResult<RunHandle> {
        let template = self.resolve_template(project_id, template_name).await?;

        let task = self
            .api
            .run_task(project_id, template.id, options.debug, options.dry_run)
            .await?;

        info!(
            project_id,
            template_id = template.id,
            template = %template.name,
            task_id = task.id,
            dry_run = options.dry_run,
            "Started Semaphore task"
        );

        Ok(RunHandle {
            task_id: task.id,
            project_id,
            template_id: template.id,
            template_name: template.name,
            status: task.status,
            url: self.api.task_url(project_id, task.id),
        })
    }

    /// Polls until the task is terminal or `timeout` has elapsed
    pub async fn wait_for_completion(
        &self, project_id: i64, task_id: i64, timeout: Duration, poll_interval: Duration,
    ) -> DeployResult<Task> {
        self.wait_for_completion_cancellable(
            project_id,
            task_id,
            timeout,
            poll_interval,
            CancellationToken::new(),
        )
        .await
    }

    /// Returns the final polled task; the loop never overruns `timeout` by
    /// more than one `poll_interval`
    pub async fn wait_for_completion_cancellable(
        &self, project_id: i64, task_id: i64, timeout: Duration, poll_interval: Duration,
        cancel: CancellationToken,
    ) -> DeployResult<Task> {
        let started = Instant::now();
        let mut polls = 0usize;

        loop {
            if cancel.is_cancelled() {
                return Err(DeployError::Cancelled {
                    task_id,
                    elapsed: started.elapsed(),
                });
            }

            let task = self.api.get_task(project_id, task_id).await?;
            polls += 1;

            if task.is_terminal() {
                info!(
                    task_id,
                    status = %task.status,
                    polls,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Semaphore task finished"
                );
                return Ok(task);
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                return Err(DeployError::PollTimeout { task_id, elapsed });
            }

            debug!(task_id, status = %task.status, polls, "Task not finished yet");

            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(DeployError::Cancelled {
                        task_id,
                        elapsed: started.elapsed(),
                    });
                }
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }
    }

    pub async fn status_summary(&self, project_id: i64, task_id: i64) -> DeployResult<RunSummary> {
        let task = self.api.get_task(project_id, task_id).await?;
        Ok(RunSummary::from_task(&task))
    }

    /// Requests a stop without waiting for it to take effect
    pub async fn stop(&self, project_id: i64, task_id: i64) -> DeployResult<()> {
        self.api.stop_task(project_id, task_id).await?;
        info!(project_id, task_id, "Requested Semaphore task stop");
        Ok(())
    }

    /// Log following paced by the poll interval and bounded by the wait timeout
    pub fn log_stream_options(&self) -> LogStreamOptions {
        LogStreamOptions {
            follow: true,
            poll_interval: self.poll_interval,
            timeout: Some(self.wait_timeout),
        }
    }

    pub fn stream_logs(
        &self, project_id: i64, task_id: i64, options: LogStreamOptions,
    ) -> TaskLogStream<'_, dyn SemaphoreApi> {
        stream_task_logs(self.api.as_ref(), project_id, task_id, options)
    }

    pub fn task_url(&self, project_id: i64, task_id: i64) -> String {
        self.api.task_url(project_id, task_id)
    }
}

#[cfg(test)]
mod tests {
    use novadash_semaphore::{
        TaskOutput,
        TaskStatus,
    };

    use super::*;
    use crate::application::testing::{
        template,
        FakeSemaphore,
    };

    fn service(fake: &Arc<FakeSemaphore>) -> DeploymentService {
        DeploymentService::new(fake.clone())
    }

    #[tokio::test]
    async fn test_resolve_and_run_uses_matching_template() {
        let fake = Arc::new(FakeSemaphore::with_templates(vec![
            template(4, "Backup"),
            template(5, "Deploy Minimal Profile"),
        ]));

        let handle = service(&fake)
            .resolve_and_run(1, "Deploy Minimal Profile")
            .await
            .unwrap();

        assert_eq!(fake.run_calls(), vec![(1, 5, false, false)]);
        assert_eq!(handle.task_id, 42);
        assert_eq!(handle.template_id, 5);
        assert_eq!(handle.template_name, "Deploy Minimal Profile");
        assert_eq!(handle.status, TaskStatus::Queued);
        assert_eq!(handle.url, "http://semaphore.test/project/1/history?t=42");
    }

    #[tokio::test]
    async fn test_resolve_and_run_passes_options() {
        let fake = Arc::new(FakeSemaphore::with_templates(vec![template(6, "Backup")]));

        service(&fake)
            .resolve_and_run_with(
                1,
                "Backup",
                RunOptions {
                    debug: true,
                    dry_run: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(fake.run_calls(), vec![(1, 6, true, true)]);
    }

    #[tokio::test]
    async fn test_unknown_template_lists_alternatives_without_running() {
        let fake = Arc::new(FakeSemaphore::with_templates(vec![template(
            5,
            "Deploy Minimal Profile",
        )]));

        match service(&fake).resolve_and_run(1, "Deploy Nonexistent").await {
            Err(DeployError::TemplateNotFound { name, available }) => {
                assert_eq!(name, "Deploy Nonexistent");
                assert_eq!(available, vec!["Deploy Minimal Profile".to_string()]);
            }
            other => panic!("expected template not found, got {other:?}"),
        }
        assert!(fake.run_calls().is_empty());
    }

    #[tokio::test]
    async fn test_template_match_is_case_sensitive() {
        let fake = Arc::new(FakeSemaphore::with_templates(vec![template(5, "Backup")]));

        let result = service(&fake).resolve_template(1, "backup").await;

        assert!(matches!(result, Err(DeployError::TemplateNotFound { .. })));
    }

    #[tokio::test]
    async fn test_first_of_duplicate_names_wins() {
        let fake = Arc::new(FakeSemaphore::with_templates(vec![
            template(7, "Backup"),
            template(8, "Backup"),
        ]));

        let resolved = service(&fake).resolve_template(1, "Backup").await.unwrap();

        assert_eq!(resolved.id, 7);
    }

    #[tokio::test]
    async fn test_template_listing_failure_propagates() {
        let fake = Arc::new(FakeSemaphore {
            fail_templates: true,
            ..Default::default()
        });

        let result = service(&fake).resolve_and_run(1, "Backup").await;

        assert!(matches!(result, Err(DeployError::Semaphore(_))));
        assert!(fake.run_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_terminal_run() {
        let fake = Arc::new(FakeSemaphore::with_status_script(vec![
            TaskStatus::Queued,
            TaskStatus::Running,
            TaskStatus::Running,
            TaskStatus::Success,
        ]));

        let started = Instant::now();
        let task = service(&fake)
            .wait_for_completion(1, 42, Duration::from_secs(60), Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(task.id, 42);
        assert_eq!(task.status, TaskStatus::Success);
        assert_eq!(fake.get_task_calls(), 4);
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_within_one_poll_of_deadline() {
        let fake = Arc::new(FakeSemaphore::with_status_script(vec![TaskStatus::Running]));
        let timeout = Duration::from_secs(5);
        let poll_interval = Duration::from_secs(2);

        let started = Instant::now();
        let result = service(&fake)
            .wait_for_completion(1, 42, timeout, poll_interval)
            .await;

        match result {
            Err(DeployError::PollTimeout { task_id, elapsed }) => {
                assert_eq!(task_id, 42);
                assert!(elapsed >= timeout);
                assert!(elapsed <= timeout + poll_interval);
            }
            other => panic!("expected poll timeout, got {other:?}"),
        }
        assert!(started.elapsed() <= timeout + poll_interval);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_stops_on_error_and_stopped() {
        for terminal in [TaskStatus::Error, TaskStatus::Stopped] {
            let fake = Arc::new(FakeSemaphore::with_status_script(vec![
                TaskStatus::Running,
                terminal,
            ]));

            let task = service(&fake)
                .wait_for_completion(1, 42, Duration::from_secs(60), Duration::from_secs(1))
                .await
                .unwrap();

            assert_eq!(task.status, terminal);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_can_be_cancelled() {
        let fake = Arc::new(FakeSemaphore::with_status_script(vec![TaskStatus::Running]));
        let service = service(&fake);
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(3)).await;
                cancel.cancel();
            })
        };

        let result = service
            .wait_for_completion_cancellable(
                1,
                42,
                Duration::from_secs(600),
                Duration::from_secs(2),
                cancel,
            )
            .await;
        canceller.await.unwrap();

        match result {
            Err(DeployError::Cancelled { task_id, elapsed }) => {
                assert_eq!(task_id, 42);
                assert_eq!(elapsed, Duration::from_secs(3));
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_status_summary_and_stop() {
        let fake = Arc::new(FakeSemaphore::with_status_script(vec![TaskStatus::Error]));
        let service = service(&fake);

        let summary = service.status_summary(1, 42).await.unwrap();
        assert!(summary.is_failed);
        assert!(summary.is_terminal);

        service.stop(1, 42).await.unwrap();
        assert_eq!(*fake.stop_calls.lock().unwrap(), vec![(1, 42)]);
    }

    #[tokio::test]
    async fn test_stream_logs_without_follow() {
        let fake = Arc::new(FakeSemaphore {
            output: vec![
                TaskOutput {
                    id: 2,
                    task_id: 42,
                    time: None,
                    output: "TASK [ping]".to_string(),
                },
                TaskOutput {
                    id: 1,
                    task_id: 42,
                    time: None,
                    output: "PLAY [all]".to_string(),
                },
            ],
            ..FakeSemaphore::with_status_script(vec![TaskStatus::Running])
        });
        let service = service(&fake);

        let mut logs = service.stream_logs(
            1,
            42,
            LogStreamOptions {
                follow: false,
                ..Default::default()
            },
        );
        let batch = logs.next_batch().await.unwrap().unwrap();

        assert_eq!(
            batch.iter().map(|e| e.output.as_str()).collect::<Vec<_>>(),
            vec!["PLAY [all]", "TASK [ping]"]
        );
        assert!(logs.next_batch().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_followed_logs_stop_at_wait_timeout() {
        let fake = Arc::new(FakeSemaphore::with_status_script(vec![TaskStatus::Running]));
        let service = DeploymentService::new(fake.clone())
            .with_poll_interval(Duration::from_secs(2))
            .with_wait_timeout(Duration::from_secs(6));

        let options = service.log_stream_options();
        assert!(options.follow);
        assert_eq!(options.timeout, Some(Duration::from_secs(6)));

        let mut logs = service.stream_logs(1, 42, options);
        let mut batches = 0;
        let err = loop {
            match logs.next_batch().await {
                Ok(Some(_)) => batches += 1,
                Ok(None) => panic!("stream ended without a timeout"),
                Err(e) => break e,
            }
        };

        assert_eq!(batches, 3);
        assert!(matches!(
            err,
            novadash_semaphore::SemaphoreError::StreamTimeout { task_id: 42, .. }
        ));
    }
}
