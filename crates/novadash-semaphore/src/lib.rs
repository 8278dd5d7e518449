//! Ansible Semaphore client for Novadash
//!
//! Talks to the Semaphore REST API with bearer-token authentication, bounded
//! retries and a typed view of projects, templates and tasks.
//!
//! # Architecture
//!
//! - `client` - HTTP transport and status classification
//! - `api` - `SemaphoreApi` trait and the typed resource accessors
//! - `retry` - per-call retry loop with exponential backoff
//! - `logs` - incremental task output streaming
//! - `types` - API response types
//! - `config` - client configuration
//!
//! # Example Usage
//!
//! ```no_run
//! use novadash_semaphore::{ClientConfig, SemaphoreApi, SemaphoreClient};
//!
//! # async fn run() -> novadash_semaphore::SemaphoreResult<()> {
//! let config = ClientConfig::new("http://localhost:3000", "token")?;
//! let client = SemaphoreClient::new(config)?;
//! let templates = client.get_templates(1).await?;
//! # Ok(())
//! # }
//! ```

mod api;
mod client;
mod config;
mod error;
mod logs;
mod retry;
mod types;

pub use api::SemaphoreApi;
pub use client::SemaphoreClient;
pub use config::{
    normalize_base_url,
    ClientConfig,
    DEFAULT_PING_TIMEOUT,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use error::{
    SemaphoreError,
    SemaphoreResult,
};
pub use logs::{
    stream_task_logs,
    LogCursor,
    LogStreamOptions,
    TaskLogStream,
    DEFAULT_LOG_POLL_INTERVAL,
    DEFAULT_LOG_TIMEOUT,
};
pub use retry::{
    RetryPolicy,
    DEFAULT_BASE_DELAY,
    DEFAULT_MAX_RETRIES,
};
pub use types::{
    parse_timestamp,
    Project,
    RunTaskRequest,
    ServerInfo,
    Task,
    TaskOutput,
    TaskStatus,
    Template,
};
