use std::path::PathBuf;

use tubecast_core::{AppConfig, Environment};

use super::*;

fn test_config() -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "info".to_string(),
        youtube_api_key: Some("test-key".to_string()),
        channel_id: Some("UC_config".to_string()),
        raw_data_path: PathBuf::from("raw.csv"),
        cleaned_data_path: PathBuf::from("clean.csv"),
        model_path: PathBuf::from("model.json"),
        collector_page_size: 25,
        collector_request_timeout_secs: 5,
        collector_user_agent: "tubecast-test".to_string(),
        model_trees: 200,
        model_test_ratio: 0.2,
        model_seed: 42,
        model_max_depth: Some(12),
    }
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["tubecast"]).is_err());
}

#[test]
fn parses_collect_with_overrides() {
    let cli = Cli::try_parse_from([
        "tubecast",
        "collect",
        "--channel",
        "UC123",
        "--out",
        "/tmp/raw.csv",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Collect {
            channel: Some(ref c),
            out: Some(ref p),
        } if c == "UC123" && p == &PathBuf::from("/tmp/raw.csv")
    ));
}

#[test]
fn parses_clean_without_flags() {
    let cli = Cli::try_parse_from(["tubecast", "clean"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Clean {
            input: None,
            output: None
        }
    ));
}

#[test]
fn parses_train_flags() {
    let cli = Cli::try_parse_from([
        "tubecast",
        "train",
        "--trees",
        "50",
        "--seed",
        "7",
        "--test-ratio",
        "0.25",
        "--no-save",
    ])
    .unwrap();
    let Commands::Train(args) = cli.command else {
        panic!("expected train command");
    };
    assert_eq!(args.trees, Some(50));
    assert_eq!(args.seed, Some(7));
    assert_eq!(args.test_ratio, Some(0.25));
    assert!(args.no_save);
    assert!(args.input.is_none());
}

#[test]
fn predict_requires_every_feature() {
    assert!(Cli::try_parse_from(["tubecast", "predict", "--likes", "200"]).is_err());

    let cli = Cli::try_parse_from([
        "tubecast",
        "predict",
        "--likes",
        "200",
        "--comments",
        "10",
        "--day",
        "15",
        "--month",
        "8",
        "--hour",
        "16",
        "--day-of-week",
        "4",
    ])
    .unwrap();
    let Commands::Predict(args) = cli.command else {
        panic!("expected predict command");
    };
    assert_eq!(
        (args.likes, args.comments, args.day, args.month, args.hour, args.day_of_week),
        (200, 10, 15, 8, 16, 4)
    );
    assert!(args.model.is_none());
}

#[test]
fn predict_rejects_negative_counts() {
    let result = Cli::try_parse_from([
        "tubecast", "predict", "--likes", "-1", "--comments", "0", "--day", "1", "--month", "1",
        "--hour", "0", "--day-of-week", "0",
    ]);
    assert!(result.is_err());
}

#[test]
fn train_flags_override_config() {
    let cli = Cli::try_parse_from(["tubecast", "train", "--trees", "10", "--seed", "9"]).unwrap();
    let Commands::Train(args) = cli.command else {
        panic!("expected train command");
    };

    let merged = pipeline::train_config(&test_config(), &args);
    assert_eq!(merged.forest.n_trees, 10);
    assert_eq!(merged.forest.seed, 9);
    assert_eq!(merged.forest.max_depth, Some(12));
    assert!((merged.test_ratio - 0.2).abs() < f64::EPSILON);
}

#[test]
fn channel_flag_overrides_configured_channel() {
    let config = test_config();

    let from_flag = collect::collector_config(&config, Some("UC_flag".to_string())).unwrap();
    assert_eq!(from_flag.channel_id, "UC_flag");
    assert_eq!(from_flag.page_size, 25);

    let from_config = collect::collector_config(&config, None).unwrap();
    assert_eq!(from_config.channel_id, "UC_config");
}

#[test]
fn collect_needs_api_key_and_channel() {
    let no_key = AppConfig {
        youtube_api_key: None,
        ..test_config()
    };
    assert!(collect::collector_config(&no_key, None).is_err());

    let no_channel = AppConfig {
        channel_id: None,
        ..test_config()
    };
    assert!(collect::collector_config(&no_channel, None).is_err());
}

#[test]
fn sample_input_is_a_valid_prediction_input() {
    assert!(pipeline::SAMPLE_INPUT.validate().is_ok());
}
