pub mod action;
pub mod error;
pub mod health;
pub mod run;

pub use action::{
    ActionCategory,
    ActionDescriptor,
    ActionOutcome,
    ActionTarget,
    QuickAction,
};
pub use error::{
    DeployError,
    DeployResult,
};
pub use health::HealthSummary;
pub use run::{
    RunHandle,
    RunOptions,
    RunSummary,
};
