use std::fmt;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

use super::error::DeployError;
use super::health::HealthSummary;
use super::run::RunHandle;

/// Closed catalog of one-click operations exposed to dashboard callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    SemaphoreDeployMinimal,
    SemaphoreDeployStandard,
    SemaphoreDeployFull,
    SemaphoreHealthCheck,
    SemaphoreBackup,
    SemaphoreUpdateContainers,
    SemaphoreStatus,
    DeploymentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionCategory {
    Deployment,
    Monitoring,
    Maintenance,
}

/// What executing an action does against Semaphore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTarget {
    RunTemplate(&'static str),
    Ping,
    HealthOverview,
}

/// Listing entry for the action catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub id: QuickAction,
    pub label: String,
    pub description: String,
    pub category: ActionCategory,
    pub requires_confirmation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
}

impl QuickAction {
    pub const ALL: [QuickAction; 8] = [
        QuickAction::SemaphoreDeployMinimal,
        QuickAction::SemaphoreDeployStandard,
        QuickAction::SemaphoreDeployFull,
        QuickAction::SemaphoreHealthCheck,
        QuickAction::SemaphoreBackup,
        QuickAction::SemaphoreUpdateContainers,
        QuickAction::SemaphoreStatus,
        QuickAction::DeploymentStatus,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            QuickAction::SemaphoreDeployMinimal => "semaphore_deploy_minimal",
            QuickAction::SemaphoreDeployStandard => "semaphore_deploy_standard",
            QuickAction::SemaphoreDeployFull => "semaphore_deploy_full",
            QuickAction::SemaphoreHealthCheck => "semaphore_health_check",
            QuickAction::SemaphoreBackup => "semaphore_backup",
            QuickAction::SemaphoreUpdateContainers => "semaphore_update_containers",
            QuickAction::SemaphoreStatus => "semaphore_status",
            QuickAction::DeploymentStatus => "deployment_status",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuickAction::SemaphoreDeployMinimal => "Deploy Minimal",
            QuickAction::SemaphoreDeployStandard => "Deploy Standard",
            QuickAction::SemaphoreDeployFull => "Deploy Full",
            QuickAction::SemaphoreHealthCheck => "Health Check",
            QuickAction::SemaphoreBackup => "Backup Now",
            QuickAction::SemaphoreUpdateContainers => "Update Containers",
            QuickAction::SemaphoreStatus => "Semaphore Status",
            QuickAction::DeploymentStatus => "Deployment Status",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QuickAction::SemaphoreDeployMinimal => "Deploy minimal profile via Semaphore",
            QuickAction::SemaphoreDeployStandard => "Deploy standard profile via Semaphore",
            QuickAction::SemaphoreDeployFull => "Deploy full profile via Semaphore",
            QuickAction::SemaphoreHealthCheck => "Run health check playbook",
            QuickAction::SemaphoreBackup => "Trigger backup via Semaphore",
            QuickAction::SemaphoreUpdateContainers => "Update all Docker containers",
            QuickAction::SemaphoreStatus => "Check whether Semaphore is reachable",
            QuickAction::DeploymentStatus => "Summarize recent deployment runs",
        }
    }

    pub fn category(&self) -> ActionCategory {
        match self {
            QuickAction::SemaphoreDeployMinimal
            | QuickAction::SemaphoreDeployStandard
            | QuickAction::SemaphoreDeployFull => ActionCategory::Deployment,
            QuickAction::SemaphoreHealthCheck
            | QuickAction::SemaphoreStatus
            | QuickAction::DeploymentStatus => ActionCategory::Monitoring,
            QuickAction::SemaphoreBackup | QuickAction::SemaphoreUpdateContainers => {
                ActionCategory::Maintenance
            }
        }
    }

    pub fn target(&self) -> ActionTarget {
        match self {
            QuickAction::SemaphoreDeployMinimal => ActionTarget::RunTemplate("Deploy Minimal Profile"),
            QuickAction::SemaphoreDeployStandard => {
                ActionTarget::RunTemplate("Deploy Standard Profile")
            }
            QuickAction::SemaphoreDeployFull => ActionTarget::RunTemplate("Deploy Full Profile"),
            QuickAction::SemaphoreHealthCheck => ActionTarget::RunTemplate("Health Check"),
            QuickAction::SemaphoreBackup => ActionTarget::RunTemplate("Backup"),
            QuickAction::SemaphoreUpdateContainers => ActionTarget::RunTemplate("Update Containers"),
            QuickAction::SemaphoreStatus => ActionTarget::Ping,
            QuickAction::DeploymentStatus => ActionTarget::HealthOverview,
        }
    }

    pub fn template_name(&self) -> Option<&'static str> {
        match self.target() {
            ActionTarget::RunTemplate(name) => Some(name),
            _ => None,
        }
    }

    pub fn confirmation_message(&self) -> Option<&'static str> {
        match self {
            QuickAction::SemaphoreDeployMinimal => Some("Deploy minimal profile to production?"),
            QuickAction::SemaphoreDeployStandard => Some("Deploy standard profile to production?"),
            QuickAction::SemaphoreDeployFull => Some("Deploy full profile to production?"),
            QuickAction::SemaphoreUpdateContainers => Some("Update all Docker containers?"),
            _ => None,
        }
    }

    pub fn requires_confirmation(&self) -> bool {
        self.confirmation_message().is_some()
    }

    pub fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            id: *self,
            label: self.label().to_string(),
            description: self.description().to_string(),
            category: self.category(),
            requires_confirmation: self.requires_confirmation(),
            confirmation_message: self.confirmation_message().map(str::to_string),
            template_name: self.template_name().map(str::to_string),
        }
    }

    pub fn catalog() -> Vec<ActionDescriptor> {
        Self::ALL.iter().map(QuickAction::descriptor).collect()
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for QuickAction {
    type Err = DeployError;

    /// Accepts catalog ids and the short names used by voice commands
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let action = match s.trim() {
            "semaphore_deploy_minimal" | "deploy_minimal" => QuickAction::SemaphoreDeployMinimal,
            "semaphore_deploy_standard" | "deploy_standard" => QuickAction::SemaphoreDeployStandard,
            "semaphore_deploy_full" | "deploy_full" => QuickAction::SemaphoreDeployFull,
            "semaphore_health_check" | "health_check" => QuickAction::SemaphoreHealthCheck,
            "semaphore_backup" | "backup" => QuickAction::SemaphoreBackup,
            "semaphore_update_containers" | "update_containers" => {
                QuickAction::SemaphoreUpdateContainers
            }
            "semaphore_status" | "status" => QuickAction::SemaphoreStatus,
            "deployment_status" => QuickAction::DeploymentStatus,
            other => return Err(DeployError::UnknownAction(other.to_string())),
        };
        Ok(action)
    }
}

/// Result of executing a quick action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutcome {
    Started(RunHandle),
    Reachability { online: bool, message: String },
    Health(HealthSummary),
}

impl ActionOutcome {
    pub fn message(&self) -> String {
        match self {
            ActionOutcome::Started(handle) => {
                format!("Task {} started successfully", handle.task_id)
            }
            ActionOutcome::Reachability { message, .. } => message.clone(),
            ActionOutcome::Health(summary) => match &summary.error {
                Some(error) => format!("Could not fetch deployment status: {}", error),
                None if summary.healthy => format!("{} recent runs, all healthy", summary.total),
                None => format!(
                    "{} recent runs: {} failed, {} running",
                    summary.total, summary.failed, summary.running
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip_through_from_str() {
        for action in QuickAction::ALL {
            assert_eq!(action.id().parse::<QuickAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_short_voice_names() {
        assert_eq!(
            "deploy_minimal".parse::<QuickAction>().unwrap(),
            QuickAction::SemaphoreDeployMinimal
        );
        assert_eq!(
            "update_containers".parse::<QuickAction>().unwrap(),
            QuickAction::SemaphoreUpdateContainers
        );
        assert_eq!(
            "status".parse::<QuickAction>().unwrap(),
            QuickAction::SemaphoreStatus
        );
    }

    #[test]
    fn test_unknown_action_is_an_error() {
        match "docker_restart".parse::<QuickAction>() {
            Err(DeployError::UnknownAction(name)) => assert_eq!(name, "docker_restart"),
            other => panic!("expected unknown action, got {other:?}"),
        }
    }

    #[test]
    fn test_deployments_require_confirmation() {
        assert_eq!(
            QuickAction::SemaphoreDeployFull.confirmation_message(),
            Some("Deploy full profile to production?")
        );
        assert!(QuickAction::SemaphoreUpdateContainers.requires_confirmation());
        assert!(!QuickAction::SemaphoreBackup.requires_confirmation());
        assert!(!QuickAction::SemaphoreStatus.requires_confirmation());
    }

    #[test]
    fn test_targets() {
        assert_eq!(
            QuickAction::SemaphoreDeployMinimal.target(),
            ActionTarget::RunTemplate("Deploy Minimal Profile")
        );
        assert_eq!(QuickAction::SemaphoreBackup.template_name(), Some("Backup"));
        assert_eq!(QuickAction::SemaphoreStatus.target(), ActionTarget::Ping);
        assert_eq!(
            QuickAction::DeploymentStatus.target(),
            ActionTarget::HealthOverview
        );
    }

    #[test]
    fn test_catalog_serialization() {
        let catalog = QuickAction::catalog();
        assert_eq!(catalog.len(), 8);

        let first = serde_json::to_value(&catalog[0]).unwrap();
        assert_eq!(first["id"], "semaphore_deploy_minimal");
        assert_eq!(first["category"], "deployment");
        assert_eq!(first["template_name"], "Deploy Minimal Profile");

        let status = serde_json::to_value(&catalog[6]).unwrap();
        assert!(status.get("confirmation_message").is_none());
        assert!(status.get("template_name").is_none());
    }
}
