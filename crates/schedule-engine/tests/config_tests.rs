//! Tests for JSON engine configuration.

use schedule_engine::{ClassifierRules, EngineConfig, ScheduleError, ScoringThresholds};

#[test]
fn empty_object_yields_defaults() {
    let config = EngineConfig::from_json_str("{}").unwrap();
    assert_eq!(config, EngineConfig::default());
    assert!(config.rules.back_to_back_is_conflict);
    assert_eq!(config.rules.min_buffer_minutes, 15);
    assert_eq!(config.default_granularity_minutes, 30);
}

#[test]
fn partial_override_keeps_other_defaults() {
    let config = EngineConfig::from_json_str(
        r#"{"rules":{"min_buffer_minutes":5},"default_granularity_minutes":15}"#,
    )
    .unwrap();

    assert_eq!(
        config.rules,
        ClassifierRules {
            back_to_back_is_conflict: true,
            min_buffer_minutes: 5,
        }
    );
    assert_eq!(config.scoring, ScoringThresholds::default());
    assert_eq!(config.default_granularity_minutes, 15);
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = EngineConfig::from_json_str("{not json").unwrap_err();
    assert!(matches!(err, ScheduleError::Config(_)));
}

#[test]
fn non_positive_granularity_rejected() {
    let err = EngineConfig::from_json_str(r#"{"default_granularity_minutes":0}"#).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidRequest(_)));
}

#[test]
fn negative_buffer_rejected() {
    let err = EngineConfig::from_json_str(r#"{"rules":{"min_buffer_minutes":-1}}"#).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidRequest(_)));
}

#[test]
fn inverted_utilization_thresholds_rejected() {
    let err = EngineConfig::from_json_str(
        r#"{"scoring":{"low_utilization_percent":95.0,"high_utilization_percent":50.0}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidRequest(_)));
}

#[test]
fn missing_file_is_reported() {
    let err = EngineConfig::from_path("/nonexistent/schedule-engine.json").unwrap_err();
    assert!(matches!(err, ScheduleError::Io(_)));
    assert!(err.to_string().starts_with("Config I/O error"));
}
