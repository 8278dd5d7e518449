use axum::{
    extract::State,
    Json,
};
use novadash_semaphore::ServerInfo;
use serde::{
    Deserialize,
    Serialize,
};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub semaphore: SemaphoreHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SemaphoreHealth {
    pub online: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let Ok(core) = state.core() else {
        return Json(HealthResponse {
            status: "config_error".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            semaphore: SemaphoreHealth {
                online: false,
                project_id: None,
            },
            config_error: state.inner.config_error.clone(),
        });
    };

    let online = core.api.ping().await;

    Json(HealthResponse {
        status: if online { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        semaphore: SemaphoreHealth {
            online,
            project_id: Some(core.project_id),
        },
        config_error: None,
    })
}

pub async fn semaphore_info(State(state): State<AppState>) -> ApiResult<Json<ServerInfo>> {
    let core = state.core()?;
    Ok(Json(core.api.get_info().await?))
}
