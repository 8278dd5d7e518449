use std::sync::Arc;

use novadash_semaphore::SemaphoreApi;
use tracing::info;

use super::deployment_service::DeploymentService;
use super::health_service::HealthService;
use crate::domain::{
    ActionDescriptor,
    ActionOutcome,
    ActionTarget,
    DeployResult,
    QuickAction,
};

/// Dispatches quick actions against the configured project
pub struct ActionService {
    api: Arc<dyn SemaphoreApi>,
    deployments: Arc<DeploymentService>,
    health: Arc<HealthService>,
    project_id: i64,
}

impl ActionService {
    pub fn new(
        api: Arc<dyn SemaphoreApi>, deployments: Arc<DeploymentService>,
        health: Arc<HealthService>, project_id: i64,
    ) -> Self {
        Self {
            api,
            deployments,
            health,
            project_id,
        }
    }

    pub fn catalog(&self) -> Vec<ActionDescriptor> {
        QuickAction::catalog()
    }

    pub async fn execute(&self, action: QuickAction) -> DeployResult<ActionOutcome> {
        info!(action = %action, project_id = self.project_id, "Executing quick action");

        match action.target() {
            ActionTarget::RunTemplate(template_name) => {
                let handle = self
                    .deployments
                    .resolve_and_run(self.project_id, template_name)
                    .await?;
                Ok(ActionOutcome::Started(handle))
            }
            ActionTarget::Ping => {
                let online = self.api.ping().await;
                let message = if online {
                    "Semaphore is online".to_string()
                } else {
                    "Semaphore is not reachable".to_string()
                };
                Ok(ActionOutcome::Reachability { online, message })
            }
            ActionTarget::HealthOverview => Ok(ActionOutcome::Health(
                self.health.health_overview(self.project_id).await,
            )),
        }
    }
}
