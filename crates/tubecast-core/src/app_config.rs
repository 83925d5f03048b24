use std::net::SocketAddr;
use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub youtube_api_key: Option<String>,
    pub channel_id: Option<String>,
    pub raw_data_path: PathBuf,
    pub cleaned_data_path: PathBuf,
    pub model_path: PathBuf,
    pub collector_page_size: u32,
    pub collector_request_timeout_secs: u64,
    pub collector_user_agent: String,
    pub model_trees: usize,
    pub model_test_ratio: f64,
    pub model_seed: u64,
    pub model_max_depth: Option<usize>,
}

impl AppConfig {
    /// The API key, for commands that talk to the `YouTube` API.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `YOUTUBE_API_KEY` is unset
    /// or blank.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.youtube_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("YOUTUBE_API_KEY".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("channel_id", &self.channel_id)
            .field("raw_data_path", &self.raw_data_path)
            .field("cleaned_data_path", &self.cleaned_data_path)
            .field("model_path", &self.model_path)
            .field("collector_page_size", &self.collector_page_size)
            .field(
                "collector_request_timeout_secs",
                &self.collector_request_timeout_secs,
            )
            .field("collector_user_agent", &self.collector_user_agent)
            .field("model_trees", &self.model_trees)
            .field("model_test_ratio", &self.model_test_ratio)
            .field("model_seed", &self.model_seed)
            .field("model_max_depth", &self.model_max_depth)
            .finish()
    }
}
