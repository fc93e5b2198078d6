//! Process-level plumbing shared by the binaries: layered configuration and logging.

pub mod config;
pub mod logging;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section,
    ServerConfig,
};
pub use logging::init_logging_from_config;
