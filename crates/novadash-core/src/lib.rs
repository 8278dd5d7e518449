pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod logging;

use std::sync::Arc;

pub use application::{
    ActionService,
    DeploymentService,
    HealthService,
};
pub use domain::{
    ActionCategory,
    ActionDescriptor,
    ActionOutcome,
    ActionTarget,
    DeployError,
    DeployResult,
    HealthSummary,
    QuickAction,
    RunHandle,
    RunOptions,
    RunSummary,
};
pub use infrastructure::{
    ConfigLoadError,
    ConfigLoader,
    NovadashConfig,
    SemaphoreSettings,
    ServerConfig,
};
use novadash_semaphore::{
    SemaphoreApi,
    SemaphoreClient,
};

/// Services wired to one shared Semaphore client
pub struct DeployContext {
    pub project_id: i64,

    pub api: Arc<dyn SemaphoreApi>,

    pub deployment_service: Arc<DeploymentService>,

    pub health_service: Arc<HealthService>,

    pub action_service: Arc<ActionService>,
}

impl DeployContext {
    pub fn from_config(config: &NovadashConfig) -> DeployResult<Self> {
        let validation = config.validate();
        if !validation.is_ok() {
            return Err(DeployError::InvalidConfig(validation.summary()));
        }

        let client = SemaphoreClient::new(config.semaphore.client_config()?)?;

        tracing::info!(
            url = %client.base_url(),
            project_id = config.semaphore.project_id,
            "Semaphore client ready"
        );

        Ok(Self::with_api(Arc::new(client), &config.semaphore))
    }

    /// Wires the services around an existing API implementation
    pub fn with_api(api: Arc<dyn SemaphoreApi>, settings: &SemaphoreSettings) -> Self {
        let deployment_service = Arc::new(
            DeploymentService::new(api.clone())
                .with_poll_interval(settings.poll_interval())
                .with_wait_timeout(settings.wait_timeout()),
        );

        let health_service =
            Arc::new(HealthService::new(api.clone()).with_window(settings.health_window));

        let action_service = Arc::new(ActionService::new(
            api.clone(),
            deployment_service.clone(),
            health_service.clone(),
            settings.project_id,
        ));

        Self {
            project_id: settings.project_id,
            api,
            deployment_service,
            health_service,
            action_service,
        }
    }
}
