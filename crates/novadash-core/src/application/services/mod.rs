pub mod action_service;
pub mod deployment_service;
pub mod health_service;
