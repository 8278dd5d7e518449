mod actions;
mod deployments;
mod health;
mod tasks;

use axum::{
    routing::get,
    Router,
};

use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/semaphore/info", get(health::semaphore_info))
        .route("/templates", get(deployments::list_templates))
        .nest("/deployments", deployments::router())
        .nest("/tasks", tasks::router())
        .nest("/actions", actions::router())
}
