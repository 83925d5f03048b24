use std::collections::HashMap;
use std::env::VarError;
use std::path::PathBuf;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

fn assert_invalid(map: &HashMap<&str, &str>, expected_var: &str) {
    let result = build_app_config(lookup_from_map(map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == expected_var),
        "expected InvalidEnvVar({expected_var}), got: {result:?}"
    );
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_is_rejected() {
    let result = parse_environment("staging");
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TUBECAST_ENV"),
        "expected InvalidEnvVar(TUBECAST_ENV), got: {result:?}"
    );
}

#[test]
fn empty_environment_yields_defaults() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");

    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:8501");
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.youtube_api_key.is_none());
    assert!(cfg.channel_id.is_none());
    assert_eq!(
        cfg.raw_data_path,
        PathBuf::from("./data/raw/YouTubeData.csv")
    );
    assert_eq!(
        cfg.cleaned_data_path,
        PathBuf::from("./data/processed/YouTubeData_Cleaned.csv")
    );
    assert_eq!(
        cfg.model_path,
        PathBuf::from("./models/youtube_regression.json")
    );
    assert_eq!(cfg.collector_page_size, 50);
    assert_eq!(cfg.collector_request_timeout_secs, 30);
    assert_eq!(cfg.collector_user_agent, "tubecast/0.1 (channel-analytics)");
    assert_eq!(cfg.model_trees, 200);
    assert!((cfg.model_test_ratio - 0.2).abs() < f64::EPSILON);
    assert_eq!(cfg.model_seed, 42);
    assert!(cfg.model_max_depth.is_none());
}

#[test]
fn overrides_are_applied() {
    let mut map = HashMap::new();
    map.insert("TUBECAST_ENV", "production");
    map.insert("YOUTUBE_API_KEY", "secret-key");
    map.insert("TUBECAST_CHANNEL_ID", "UC123");
    map.insert("TUBECAST_MODEL_PATH", "/tmp/model.json");
    map.insert("TUBECAST_MODEL_TREES", "25");
    map.insert("TUBECAST_MODEL_TEST_RATIO", "0.25");
    map.insert("TUBECAST_MODEL_SEED", "7");
    map.insert("TUBECAST_MODEL_MAX_DEPTH", "12");
    let cfg = build_app_config(lookup_from_map(&map)).expect("overrides should be valid");

    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.youtube_api_key.as_deref(), Some("secret-key"));
    assert_eq!(cfg.channel_id.as_deref(), Some("UC123"));
    assert_eq!(cfg.model_path, PathBuf::from("/tmp/model.json"));
    assert_eq!(cfg.model_trees, 25);
    assert!((cfg.model_test_ratio - 0.25).abs() < f64::EPSILON);
    assert_eq!(cfg.model_seed, 7);
    assert_eq!(cfg.model_max_depth, Some(12));
}

#[test]
fn blank_api_key_is_treated_as_unset() {
    let mut map = HashMap::new();
    map.insert("YOUTUBE_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.youtube_api_key.is_none());
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = HashMap::new();
    map.insert("YOUTUBE_API_KEY", "super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"), "leaked key: {rendered}");
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn invalid_bind_addr_is_rejected() {
    let mut map = HashMap::new();
    map.insert("TUBECAST_BIND_ADDR", "not-a-socket-addr");
    assert_invalid(&map, "TUBECAST_BIND_ADDR");
}

#[test]
fn page_size_above_api_limit_is_rejected() {
    let mut map = HashMap::new();
    map.insert("TUBECAST_COLLECTOR_PAGE_SIZE", "51");
    assert_invalid(&map, "TUBECAST_COLLECTOR_PAGE_SIZE");
}

#[test]
fn page_size_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("TUBECAST_COLLECTOR_PAGE_SIZE", "0");
    assert_invalid(&map, "TUBECAST_COLLECTOR_PAGE_SIZE");
}

#[test]
fn request_timeout_must_be_numeric() {
    let mut map = HashMap::new();
    map.insert("TUBECAST_COLLECTOR_REQUEST_TIMEOUT_SECS", "soon");
    assert_invalid(&map, "TUBECAST_COLLECTOR_REQUEST_TIMEOUT_SECS");
}

#[test]
fn zero_trees_is_rejected() {
    let mut map = HashMap::new();
    map.insert("TUBECAST_MODEL_TREES", "0");
    assert_invalid(&map, "TUBECAST_MODEL_TREES");
}

#[test]
fn test_ratio_outside_unit_interval_is_rejected() {
    for raw in ["0", "1", "1.5", "-0.1", "NaN", "abc"] {
        let mut map = HashMap::new();
        map.insert("TUBECAST_MODEL_TEST_RATIO", raw);
        assert_invalid(&map, "TUBECAST_MODEL_TEST_RATIO");
    }
}

#[test]
fn max_depth_must_be_numeric() {
    let mut map = HashMap::new();
    map.insert("TUBECAST_MODEL_MAX_DEPTH", "deep");
    assert_invalid(&map, "TUBECAST_MODEL_MAX_DEPTH");
}

#[test]
fn require_api_key_reports_missing_var() {
    let config = build_app_config(lookup_from_map(&HashMap::new())).unwrap();
    assert!(matches!(
        config.require_api_key(),
        Err(ConfigError::MissingEnvVar(ref var)) if var == "YOUTUBE_API_KEY"
    ));

    let map = HashMap::from([("YOUTUBE_API_KEY", "abc123")]);
    let config = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(config.require_api_key().unwrap(), "abc123");
}
