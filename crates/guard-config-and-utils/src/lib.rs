//! Configuration, paths, errors and logging setup for storage-guard.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_HEALTH_THRESHOLD_PERCENT, DEFAULT_LOG_LEVEL, DEFAULT_QUOTA_BYTES,
    LOG_LEVEL_ENV,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, SERVICE_NAME};
pub use paths::Paths;
