use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Largest `maxResults` the `YouTube` Data API accepts for list endpoints.
const MAX_PAGE_SIZE: u32 = 50;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("TUBECAST_ENV", "development"))?;
    let bind_addr = parse_addr("TUBECAST_BIND_ADDR", "127.0.0.1:8501")?;
    let log_level = or_default("TUBECAST_LOG_LEVEL", "info");

    let youtube_api_key = optional("YOUTUBE_API_KEY");
    let channel_id = optional("TUBECAST_CHANNEL_ID");

    let raw_data_path = PathBuf::from(or_default(
        "TUBECAST_RAW_DATA_PATH",
        "./data/raw/YouTubeData.csv",
    ));
    let cleaned_data_path = PathBuf::from(or_default(
        "TUBECAST_CLEANED_DATA_PATH",
        "./data/processed/YouTubeData_Cleaned.csv",
    ));
    let model_path = PathBuf::from(or_default(
        "TUBECAST_MODEL_PATH",
        "./models/youtube_regression.json",
    ));

    let collector_page_size = parse_u32("TUBECAST_COLLECTOR_PAGE_SIZE", "50")?;
    if collector_page_size == 0 || collector_page_size > MAX_PAGE_SIZE {
        return Err(invalid(
            "TUBECAST_COLLECTOR_PAGE_SIZE",
            format!("must be between 1 and {MAX_PAGE_SIZE}, got {collector_page_size}"),
        ));
    }
    let collector_request_timeout_secs =
        parse_u64("TUBECAST_COLLECTOR_REQUEST_TIMEOUT_SECS", "30")?;
    let collector_user_agent = or_default(
        "TUBECAST_COLLECTOR_USER_AGENT",
        "tubecast/0.1 (channel-analytics)",
    );

    let model_trees = parse_usize("TUBECAST_MODEL_TREES", "200")?;
    if model_trees == 0 {
        return Err(invalid(
            "TUBECAST_MODEL_TREES",
            "must be at least 1".to_string(),
        ));
    }

    let raw_ratio = or_default("TUBECAST_MODEL_TEST_RATIO", "0.2");
    let model_test_ratio = raw_ratio
        .parse::<f64>()
        .map_err(|e| invalid("TUBECAST_MODEL_TEST_RATIO", e.to_string()))?;
    if !(model_test_ratio > 0.0 && model_test_ratio < 1.0) {
        return Err(invalid(
            "TUBECAST_MODEL_TEST_RATIO",
            format!("must be strictly between 0 and 1, got {raw_ratio}"),
        ));
    }

    let model_seed = parse_u64("TUBECAST_MODEL_SEED", "42")?;
    let model_max_depth = match optional("TUBECAST_MODEL_MAX_DEPTH") {
        Some(raw) => Some(
            raw.parse::<usize>()
                .map_err(|e| invalid("TUBECAST_MODEL_MAX_DEPTH", e.to_string()))?,
        ),
        None => None,
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        youtube_api_key,
        channel_id,
        raw_data_path,
        cleaned_data_path,
        model_path,
        collector_page_size,
        collector_request_timeout_secs,
        collector_user_agent,
        model_trees,
        model_test_ratio,
        model_seed,
        model_max_depth,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TUBECAST_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
