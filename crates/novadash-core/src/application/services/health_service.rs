use std::sync::Arc;

use futures::stream::{
    self,
    StreamExt,
};
use novadash_semaphore::SemaphoreApi;
use tracing::{
    debug,
    warn,
};

use crate::domain::{
    DeployResult,
    HealthSummary,
    RunSummary,
};

pub const DEFAULT_HEALTH_WINDOW: usize = 10;

const MAX_CONCURRENT_DETAIL_FETCHES: usize = 4;

/// Aggregates recent run history for dashboard health widgets
pub struct HealthService {
    api: Arc<dyn SemaphoreApi>,
    window: usize,
}

impl HealthService {
    pub fn new(api: Arc<dyn SemaphoreApi>) -> Self {
        Self {
            api,
            window: DEFAULT_HEALTH_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Summaries of up to `limit` recent runs, most recent first
    ///
    /// Listing rows without an id and runs whose detail fetch fails are left
    /// out; only a failure of the listing itself is an error.
    pub async fn recent_runs(&self, project_id: i64, limit: usize) -> DeployResult<Vec<RunSummary>> {
        let tasks = self.api.get_tasks(project_id, limit).await?;
        let api = self.api.as_ref();

        let ids: Vec<i64> = tasks
            .into_iter()
            .take(limit)
            .map(|task| task.id)
            .filter(|&id| {
                if id <= 0 {
                    debug!(project_id, "Skipping history row without a task id");
                }
                id > 0
            })
            .collect();

        let runs = stream::iter(ids)
            .map(|task_id| async move { (task_id, api.get_task(project_id, task_id).await) })
            .buffered(MAX_CONCURRENT_DETAIL_FETCHES)
            .filter_map(|(task_id, detail)| async move {
                match detail {
                    Ok(task) => Some(RunSummary::from_task(&task)),
                    Err(e) => {
                        warn!(
                            project_id,
                            task_id,
                            error = %e,
                            "Dropping run from history, detail fetch failed"
                        );
                        None
                    }
                }
            })
            .collect::<Vec<_>>()
            .await;

        Ok(runs)
    }

    /// Never fails; a failed aggregation yields a degraded summary
    pub async fn health_overview(&self, project_id: i64) -> HealthSummary {
        match self.recent_runs(project_id, self.window).await {
            Ok(runs) => HealthSummary::from_runs(&runs),
            Err(e) => {
                warn!(project_id, error = %e, "Deployment health unavailable");
                HealthSummary::degraded(e.to_string())
            }
        }
    }
}
