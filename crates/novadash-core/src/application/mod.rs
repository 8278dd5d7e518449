pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use services::action_service::ActionService;
pub use services::deployment_service::{
    DeploymentService,
    DEFAULT_POLL_INTERVAL,
    DEFAULT_WAIT_TIMEOUT,
};
pub use services::health_service::{
    HealthService,
    DEFAULT_HEALTH_WINDOW,
};
