//! Typed Semaphore resource accessors

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::client::SemaphoreClient;
use crate::types::{
    Project,
    RunTaskRequest,
    ServerInfo,
    Task,
    TaskOutput,
    Template,
};
use crate::SemaphoreResult;

/// Resource operations against a Semaphore server
///
/// Implementations keep no state between calls. `SemaphoreClient` is the
/// HTTP implementation; the orchestration layer only sees this trait.
#[async_trait]
pub trait SemaphoreApi: Send + Sync {
    /// Unauthenticated liveness probe. Never fails; errors read as `false`.
    async fn ping(&self) -> bool;

    async fn get_info(&self) -> SemaphoreResult<ServerInfo>;

    async fn get_projects(&self) -> SemaphoreResult<Vec<Project>>;

    async fn get_project(&self, project_id: i64) -> SemaphoreResult<Project>;

    async fn get_templates(&self, project_id: i64) -> SemaphoreResult<Vec<Template>>;

    async fn get_template(&self, project_id: i64, template_id: i64) -> SemaphoreResult<Template>;

    /// Most recent tasks first, as ordered by the server
    async fn get_tasks(&self, project_id: i64, limit: usize) -> SemaphoreResult<Vec<Task>>;

    async fn get_task(&self, project_id: i64, task_id: i64) -> SemaphoreResult<Task>;

    async fn get_task_output(
        &self, project_id: i64, task_id: i64,
    ) -> SemaphoreResult<Vec<TaskOutput>>;

    /// Starts a run of a template and returns the queued task
    async fn run_task(
        &self, project_id: i64, template_id: i64, debug: bool, dry_run: bool,
    ) -> SemaphoreResult<Task>;

    /// Requests a stop; does not wait for the task to reach `stopped`
    async fn stop_task(&self, project_id: i64, task_id: i64) -> SemaphoreResult<()>;

    /// Link to a task in the Semaphore web UI
    fn task_url(&self, project_id: i64, task_id: i64) -> String;
}

#[async_trait]
impl SemaphoreApi for SemaphoreClient {
    async fn ping(&self) -> bool {
        SemaphoreClient::ping(self).await
    }

    async fn get_info(&self) -> SemaphoreResult<ServerInfo> {
        self.request_typed(Method::GET, "/info", None).await
    }

    async fn get_projects(&self) -> SemaphoreResult<Vec<Project>> {
        self.request_typed(Method::GET, "/projects", None).await
    }

    async fn get_project(&self, project_id: i64) -> SemaphoreResult<Project> {
        self.request_typed(Method::GET, &format!("/projects/{project_id}"), None)
            .await
    }

    async fn get_templates(&self, project_id: i64) -> SemaphoreResult<Vec<Template>> {
        self.request_typed(
            Method::GET,
            &format!("/project/{project_id}/templates"),
            None,
        )
        .await
    }

    async fn get_template(&self, project_id: i64, template_id: i64) -> SemaphoreResult<Template> {
        self.request_typed(
            Method::GET,
            &format!("/project/{project_id}/templates/{template_id}"),
            None,
        )
        .await
    }

    async fn get_tasks(&self, project_id: i64, limit: usize) -> SemaphoreResult<Vec<Task>> {
        self.request_typed(
            Method::GET,
            &format!("/project/{project_id}/tasks?limit={limit}"),
            None,
        )
        .await
    }

    async fn get_task(&self, project_id: i64, task_id: i64) -> SemaphoreResult<Task> {
        self.request_typed(
            Method::GET,
            &format!("/project/{project_id}/tasks/{task_id}"),
            None,
        )
        .await
    }

    async fn get_task_output(
        &self, project_id: i64, task_id: i64,
    ) -> SemaphoreResult<Vec<TaskOutput>> {
        self.request_typed(
            Method::GET,
            &format!("/project/{project_id}/tasks/{task_id}/output"),
            None,
        )
        .await
    }

    async fn run_task(
        &self, project_id: i64, template_id: i64, debug: bool, dry_run: bool,
    ) -> SemaphoreResult<Task> {
        let payload = serde_json::to_value(RunTaskRequest {
            template_id,
            debug,
            dry_run,
        })?;

        self.request_typed(
            Method::POST,
            &format!("/project/{project_id}/tasks"),
            Some(&payload),
        )
        .await
    }

    async fn stop_task(&self, project_id: i64, task_id: i64) -> SemaphoreResult<()> {
        let _: Value = self
            .request(
                Method::POST,
                &format!("/project/{project_id}/tasks/{task_id}/stop"),
                None,
            )
            .await?;
        Ok(())
    }

    fn task_url(&self, project_id: i64, task_id: i64) -> String {
        SemaphoreClient::task_url(self, project_id, task_id)
    }
}
