//! Tests for configuration loading and validation

use nodturn::{
    config::{Config, EXAMPLE_CONFIG},
    error::AppError,
};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("nodturn-{}-{name}", std::process::id()))
}

#[test]
fn test_config_file_round_trip() {
    let path = temp_path("round_trip.yaml");
    let mut config = Config::default();
    config.gesture.hold_duration_ms = 650;
    config.detection.left_keypoint = "left_eye".to_string();
    config.detection.right_keypoint = "right_eye".to_string();

    config.to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, config);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_missing_file_is_io_error() {
    let result = Config::from_file(temp_path("does_not_exist.yaml"));
    assert!(matches!(result, Err(AppError::Io(_))));
}

#[test]
fn test_example_config_is_valid() {
    let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
    config.validate().unwrap();
    let params = config.gesture_params();
    assert_eq!(params.angle_threshold, 45.0);
    assert_eq!(params.cooldown_ms, 1500);
}

#[test]
fn test_dead_zone_misuse_rejected_at_load() {
    let yaml = "gesture:\n  angle_threshold: 20.0\n  dead_zone: 25.0\n";
    let config = Config::from_yaml(yaml).unwrap();
    match config.validate() {
        Err(AppError::ConfigError(msg)) => assert!(msg.contains("Dead zone")),
        other => panic!("Expected ConfigError, got {other:?}"),
    }
}
