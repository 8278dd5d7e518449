use axum::{
    extract::State,
    http::StatusCode,
    routing::{
        get,
        post,
    },
    Json,
    Router,
};
use novadash_core::{
    HealthSummary,
    RunHandle,
    RunOptions,
};
use novadash_semaphore::Template;
use serde::Deserialize;

use crate::error::{
    ApiResult,
    AppError,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TriggerDeploymentRequest {
    pub template_name: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub dry_run: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(trigger_deployment))
        .route("/health", get(deployment_health))
}

pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Json<Vec<Template>>> {
    let core = state.core()?;
    let templates = core
        .deployment_service
        .list_templates(core.project_id)
        .await?;
    Ok(Json(templates))
}

async fn trigger_deployment(
    State(state): State<AppState>, Json(request): Json<TriggerDeploymentRequest>,
) -> ApiResult<(StatusCode, Json<RunHandle>)> {
    let core = state.core()?;

    let template_name = request.template_name.trim();
    if template_name.is_empty() {
        return Err(AppError::bad_request("template_name must not be empty"));
    }

    let handle = core
        .deployment_service
        .resolve_and_run_with(
            core.project_id,
            template_name,
            RunOptions {
                debug: request.debug,
                dry_run: request.dry_run,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(handle)))
}

async fn deployment_health(State(state): State<AppState>) -> ApiResult<Json<HealthSummary>> {
    let core = state.core()?;
    Ok(Json(core.health_service.health_overview(core.project_id).await))
}
