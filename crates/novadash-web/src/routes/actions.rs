use axum::{
    extract::{
        Path,
        State,
    },
    routing::{
        get,
        post,
    },
    Json,
    Router,
};
use novadash_core::{
    ActionDescriptor,
    ActionOutcome,
    QuickAction,
};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub action: QuickAction,
    pub message: String,
    pub outcome: ActionOutcome,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_actions))
        .route("/{id}", post(execute_action))
}

async fn list_actions() -> Json<Vec<ActionDescriptor>> {
    Json(QuickAction::catalog())
}

async fn execute_action(
    State(state): State<AppState>, Path(action_id): Path<String>,
) -> ApiResult<Json<ActionResponse>> {
    let action: QuickAction = action_id.parse()?;
    let core = state.core()?;

    let outcome = core.action_service.execute(action).await?;

    Ok(Json(ActionResponse {
        action,
        message: outcome.message(),
        outcome,
    }))
}
