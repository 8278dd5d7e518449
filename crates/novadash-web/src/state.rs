use std::sync::Arc;

use novadash_core::DeployContext;

use crate::error::AppError;

pub struct AppStateInner {
    pub core: Option<DeployContext>,
    pub config_error: Option<String>,
}

/// Immutable after startup; a bad config keeps the server up in an error mode
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

impl AppState {
    pub fn initialized(core: DeployContext) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                core: Some(core),
                config_error: None,
            }),
        }
    }

    pub fn config_error(error: String) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                core: None,
                config_error: Some(error),
            }),
        }
    }

    pub fn core(&self) -> Result<&DeployContext, AppError> {
        self.inner
            .core
            .as_ref()
            .ok_or_else(|| AppError::not_initialized(self.inner.config_error.as_deref()))
    }
}
