//! Shared types and configuration for the tubecast channel-analytics pipeline.

pub mod app_config;
pub mod config;
pub mod parse;
pub mod records;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use parse::{coerce_count, parse_timestamp};
pub use records::{CleanedVideoRecord, VideoRecord};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
