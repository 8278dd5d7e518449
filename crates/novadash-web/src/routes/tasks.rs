use std::time::Duration;

use axum::{
    extract::{
        Path,
        Query,
        State,
    },
    http::StatusCode,
    routing::{
        get,
        post,
    },
    Json,
    Router,
};
use novadash_core::RunSummary;
use novadash_semaphore::{
    LogCursor,
    LogStreamOptions,
    TaskOutput,
};
use serde::Deserialize;

use crate::error::{
    ApiResult,
    AppError,
};
use crate::state::AppState;

const DEFAULT_TASK_LIMIT: usize = 10;

const MAX_TASK_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct WaitQuery {
    pub timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    /// Only entries with a greater id are returned
    pub after: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks))
        .route("/{id}", get(get_task))
        .route("/{id}/wait", post(wait_for_task))
        .route("/{id}/stop", post(stop_task))
        .route("/{id}/logs", get(get_task_logs))
}

async fn list_tasks(
    State(state): State<AppState>, Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<RunSummary>>> {
    let core = state.core()?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_TASK_LIMIT)
        .clamp(1, MAX_TASK_LIMIT);

    let runs = core
        .health_service
        .recent_runs(core.project_id, limit)
        .await?;
    Ok(Json(runs))
}

async fn get_task(
    State(state): State<AppState>, Path(task_id): Path<i64>,
) -> ApiResult<Json<RunSummary>> {
    let core = state.core()?;
    let summary = core
        .deployment_service
        .status_summary(core.project_id, task_id)
        .await?;
    Ok(Json(summary))
}

/// Blocks the request until the task is terminal; 202 when it is still running
async fn wait_for_task(
    State(state): State<AppState>, Path(task_id): Path<i64>, Query(query): Query<WaitQuery>,
) -> ApiResult<Json<RunSummary>> {
    let core = state.core()?;
    let service = &core.deployment_service;

    // Never hold a request longer than the configured wait timeout
    let timeout = query
        .timeout_secs
        .map(Duration::from_secs)
        .map_or(service.wait_timeout(), |t| t.min(service.wait_timeout()));
    let poll_interval = match query.poll_interval_secs {
        Some(0) => return Err(AppError::bad_request("poll_interval_secs must be positive")),
        Some(secs) => Duration::from_secs(secs),
        None => service.poll_interval(),
    };

    let task = service
        .wait_for_completion(core.project_id, task_id, timeout, poll_interval)
        .await?;
    Ok(Json(RunSummary::from_task(&task)))
}

async fn stop_task(
    State(state): State<AppState>, Path(task_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let core = state.core()?;
    core.deployment_service
        .stop(core.project_id, task_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_task_logs(
    State(state): State<AppState>, Path(task_id): Path<i64>, Query(query): Query<LogsQuery>,
) -> ApiResult<Json<Vec<TaskOutput>>> {
    let core = state.core()?;
    let service = &core.deployment_service;

    let mut logs = service
        .stream_logs(
            core.project_id,
            task_id,
            LogStreamOptions {
                follow: false,
                ..service.log_stream_options()
            },
        )
        .with_cursor(LogCursor::after(query.after.unwrap_or(0)));

    let entries = logs.next_batch().await?.unwrap_or_default();
    Ok(Json(entries))
}
