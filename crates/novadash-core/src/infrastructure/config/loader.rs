use std::path::{
    Path,
    PathBuf,
};

use thiserror::Error;

use super::interpolation::{
    interpolate_toml,
    InterpolationError,
};
use super::schema::NovadashConfig;

pub const CONFIG_PATH_ENV: &str = "NOVADASH_CONFIG_PATH";

/// Used when no config file exists; the connection comes from the environment
const ENV_ONLY_CONFIG: &str = r#"
[semaphore]
url = "${SEMAPHORE_URL:-http://localhost:3000}"
api_token = "${SEMAPHORE_API_TOKEN:-}"
"#;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Environment variable interpolation failed: {0}")]
    InterpolationError(#[from] InterpolationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type ConfigLoadResult<T> = Result<T, ConfigLoadError>;

pub struct ConfigLoader;

impl ConfigLoader {
    /// `NOVADASH_CONFIG_PATH`, then the user config dir, then `./config.toml`
    pub fn discover_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            tracing::debug!("Using config path from {}: {}", CONFIG_PATH_ENV, path);
            return PathBuf::from(path);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("novadash").join("config.toml");
            if path.exists() {
                tracing::debug!("Using user config path: {}", path.display());
                return path;
            }
        }

        let fallback = PathBuf::from("config.toml");
        tracing::debug!("Using fallback config path: {}", fallback.display());
        fallback
    }

    pub fn load(path: &Path) -> ConfigLoadResult<NovadashConfig> {
        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Loads `path`, or falls back to `SEMAPHORE_URL` / `SEMAPHORE_API_TOKEN`
    /// when the file does not exist
    pub fn load_or_env(path: &Path) -> ConfigLoadResult<NovadashConfig> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(
                "No config file at {}, using environment defaults",
                path.display()
            );
            Self::parse(ENV_ONLY_CONFIG)
        }
    }

    pub fn parse(content: &str) -> ConfigLoadResult<NovadashConfig> {
        let mut value: toml::Value = toml::from_str(content)?;

        interpolate_toml(&mut value)?;

        let config: NovadashConfig = value.try_into().map_err(|e| {
            ConfigLoadError::InvalidConfig(format!("Failed to deserialize config: {}", e))
        })?;

        tracing::debug!(
            url = %config.semaphore.url,
            project_id = config.semaphore.project_id,
            "Loaded config"
        );

        Ok(config)
    }
}
