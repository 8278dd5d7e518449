//! Semaphore HTTP transport

use std::sync::Arc;
use std::time::Duration;

use reqwest::{
    Method,
    StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::{
    SemaphoreError,
    SemaphoreResult,
};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Authenticated Semaphore REST client
///
/// Cheap to clone; clones share the underlying connection pool. No state is
/// kept between requests.
#[derive(Clone)]
pub struct SemaphoreClient {
    http_client: Arc<reqwest::Client>,
    config: Arc<ClientConfig>,
    api_url: String,
    auth_header: String,
}

impl std::fmt::Debug for SemaphoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemaphoreClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl SemaphoreClient {
    pub fn new(config: ClientConfig) -> SemaphoreResult<Self> {
        Self::with_http_client(config, None)
    }

    /// Builds a client, reusing `http_client` when one is supplied
    pub fn with_http_client(
        config: ClientConfig, http_client: Option<Arc<reqwest::Client>>,
    ) -> SemaphoreResult<Self> {
        let http_client = match http_client {
            Some(client) => client,
            None => Arc::new(build_http_client(config.timeout())?),
        };

        Ok(Self {
            http_client,
            api_url: config.api_url(),
            auth_header: config.auth_header(),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// Issues an authenticated request against `/api{path}` with retries
    ///
    /// 200/201 return the parsed body (an empty object when the body is
    /// empty) and 204 returns an empty object.
    pub async fn request(
        &self, method: Method, path: &str, body: Option<&Value>,
    ) -> SemaphoreResult<Value> {
        let url = format!("{}/{}", self.api_url, path.trim_start_matches('/'));

        self.config
            .retry_policy()
            .retry(|attempt| {
                let method = method.clone();
                let url = url.as_str();
                async move {
                    debug!(%method, url, attempt, "Sending Semaphore request");
                    self.send_once(method, url, path, body).await
                }
            })
            .await
    }

    /// Same as [`request`](Self::request), decoding the body into `T`
    pub async fn request_typed<T: DeserializeOwned>(
        &self, method: Method, path: &str, body: Option<&Value>,
    ) -> SemaphoreResult<T> {
        let value = self.request(method, path, body).await?;
        serde_json::from_value(value).map_err(|e| {
            SemaphoreError::Serialization(format!(
                "Failed to parse Semaphore response from {}: {}",
                path, e
            ))
        })
    }

    async fn send_once(
        &self, method: Method, url: &str, path: &str, body: Option<&Value>,
    ) -> SemaphoreResult<Value> {
        let mut request = self
            .http_client
            .request(method, url)
            .timeout(self.config.timeout())
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await.map_err(SemaphoreError::from_transport)?;
        let status = response.status();
        let text = response.text().await.map_err(SemaphoreError::from_transport)?;

        classify_response(status, &text, path)
    }

    /// Unauthenticated liveness probe; never fails
    pub async fn ping(&self) -> bool {
        let url = format!("{}/ping", self.api_url);
        match self
            .http_client
            .get(&url)
            .timeout(self.config.ping_timeout())
            .send()
            .await
        {
            Ok(response) => {
                let alive = response.status() == StatusCode::OK;
                debug!(status = %response.status(), alive, "Semaphore ping");
                alive
            }
            Err(e) => {
                debug!(error = %e, "Semaphore ping failed");
                false
            }
        }
    }

    /// Link to a task in the Semaphore web UI
    pub fn task_url(&self, project_id: i64, task_id: i64) -> String {
        format!(
            "{}/project/{}/history?t={}",
            self.config.base_url(),
            project_id,
            task_id
        )
    }
}

/// Maps a Semaphore response onto the error taxonomy
pub(crate) fn classify_response(status: StatusCode, body: &str, path: &str) -> SemaphoreResult<Value> {
    match status {
        StatusCode::OK | StatusCode::CREATED => {
            if body.trim().is_empty() {
                Ok(Value::Object(Default::default()))
            } else {
                serde_json::from_str(body).map_err(|e| {
                    SemaphoreError::Serialization(format!(
                        "Invalid JSON from Semaphore for {}: {}",
                        path, e
                    ))
                })
            }
        }
        StatusCode::NO_CONTENT => Ok(Value::Object(Default::default())),
        StatusCode::UNAUTHORIZED => Err(SemaphoreError::Unauthorized),
        StatusCode::NOT_FOUND => Err(SemaphoreError::NotFound {
            path: path.to_string(),
        }),
        s if s.is_server_error() => Err(SemaphoreError::ServerError {
            status: s.as_u16(),
            body: body.to_string(),
            attempts: 1,
        }),
        s => Err(SemaphoreError::ApiError {
            status: s.as_u16(),
            body: if body.is_empty() {
                format!("HTTP {}", s.as_u16())
            } else {
                body.to_string()
            },
        }),
    }
}

fn build_http_client(timeout: Duration) -> SemaphoreResult<reqwest::Client> {
    // Already-installed providers are fine
    let _ = rustls::crypto::ring::default_provider().install_default();

    reqwest::Client::builder()
        .pool_max_idle_per_host(DEFAULT_POOL_MAX_IDLE_PER_HOST)
        .timeout(timeout)
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .map_err(|e| SemaphoreError::InvalidConfig(format!("Failed to create HTTP client: {}", e)))
}
