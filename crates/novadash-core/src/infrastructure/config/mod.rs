pub mod interpolation;
pub mod loader;
pub mod schema;
pub mod validation;

pub use interpolation::{
    interpolate,
    InterpolationError,
};
pub use loader::{
    ConfigLoadError,
    ConfigLoadResult,
    ConfigLoader,
    CONFIG_PATH_ENV,
};
pub use schema::{
    NovadashConfig,
    SemaphoreSettings,
    ServerConfig,
};
pub use validation::{
    ConfigError,
    ValidationResult,
};
