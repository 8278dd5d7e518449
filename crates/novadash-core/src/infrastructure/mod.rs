pub mod config;

pub use config::{
    ConfigLoadError,
    ConfigLoader,
    NovadashConfig,
    SemaphoreSettings,
    ServerConfig,
};
