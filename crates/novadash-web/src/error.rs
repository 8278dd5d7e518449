use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
    Json,
};
use novadash_core::DeployError;
use novadash_semaphore::SemaphoreError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: ApiError,
}

impl AppError {
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::new("BAD_REQUEST", message),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", message),
        )
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiError::new("UNAUTHORIZED", message),
        )
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            ApiError::new("SEMAPHORE_UNAVAILABLE", message),
        )
    }

    pub fn not_initialized(reason: Option<&str>) -> Self {
        let message = match reason {
            Some(reason) => format!("Semaphore is not configured: {}", reason),
            None => "Semaphore is not configured".to_string(),
        };
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiError::new("NOT_CONFIGURED", message),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<DeployError> for AppError {
    fn from(err: DeployError) -> Self {
        let message = err.to_string();
        match err {
            DeployError::TemplateNotFound { available, .. } => Self::new(
                StatusCode::NOT_FOUND,
                ApiError::new("TEMPLATE_NOT_FOUND", message)
                    .with_details(serde_json::json!(available)),
            ),
            DeployError::PollTimeout { task_id, elapsed } => Self::new(
                StatusCode::ACCEPTED,
                ApiError::new("STILL_RUNNING", message).with_details(serde_json::json!({
                    "task_id": task_id,
                    "elapsed_seconds": elapsed.as_secs_f64(),
                })),
            ),
            DeployError::Semaphore(SemaphoreError::StreamTimeout { task_id, elapsed }) => Self::new(
                StatusCode::ACCEPTED,
                ApiError::new("STILL_RUNNING", message).with_details(serde_json::json!({
                    "task_id": task_id,
                    "elapsed_seconds": elapsed.as_secs_f64(),
                })),
            ),
            DeployError::UnknownAction(_) => Self::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("UNKNOWN_ACTION", message),
            ),
            DeployError::InvalidConfig(_) => AppError::bad_request(message),
            DeployError::Semaphore(SemaphoreError::Unauthorized) => AppError::unauthorized(
                format!("{}. Reconfigure the Semaphore API token.", message),
            ),
            DeployError::Semaphore(SemaphoreError::NotFound { .. }) => AppError::not_found(message),
            DeployError::Semaphore(
                SemaphoreError::ServerError { .. }
                | SemaphoreError::Timeout { .. }
                | SemaphoreError::ConnectionError { .. },
            ) => AppError::bad_gateway(message),
            _ => AppError::internal(message),
        }
    }
}

impl From<SemaphoreError> for AppError {
    fn from(err: SemaphoreError) -> Self {
        DeployError::from(err).into()
    }
}

pub type ApiResult<T> = Result<T, AppError>;
