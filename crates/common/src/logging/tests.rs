//! Unit tests for the logging subsystem.

use std::path::PathBuf;

use tracing::Level;

use super::{
    format_service_name, manager::build_filter, service::logger_config, types::*,
    LoggingInitConfig, Rotation,
};

#[test]
fn test_format_service_name() {
    assert_eq!(format_service_name("biblio", None), "biblio");
    assert_eq!(format_service_name("biblio", Some("dev")), "biblio%dev");
}

#[test]
fn test_logger_config_builder_pattern() {
    let config = LoggerConfig::new("test-service".to_string())
        .with_default_level(Level::WARN)
        .with_json_logging(true)
        .with_stderr(true);

    assert_eq!(config.service_name, "test-service");
    assert_eq!(config.default_level, Level::WARN);
    assert!(config.stdout_config.json_format);
    assert!(config.stdout_config.use_stderr);
    assert!(config.file_logging_config.is_none());
}

#[test]
fn test_file_logging_config_defaults() {
    let config = FileLoggingConfig::new(PathBuf::from("/tmp/logs"), "biblio".to_string())
        .with_rotation(Rotation::HOURLY);

    assert_eq!(config.file_name_prefix, "biblio");
    assert_eq!(config.rotation, Rotation::HOURLY);
    assert!(!config.json_format);
}

#[test]
fn test_init_config_uses_default_prefix() {
    let dir = PathBuf::from("/tmp/logs");
    let config = logger_config(&LoggingInitConfig {
        service_base_name: "biblio-cli",
        service_label: Some("dev"),
        default_level: Level::INFO,
        log_dir: Some(&dir),
        log_file_prefix: None,
        json_format: None,
        use_stderr: true,
        default_log_prefix: "biblio",
    });

    assert_eq!(config.service_name, "biblio-cli%dev");
    let file = config.file_logging_config.unwrap();
    assert_eq!(file.file_name_prefix, "biblio");
    assert_eq!(file.directory, dir);
    assert!(!config.stdout_config.json_format);
}

#[test]
fn test_filter_keeps_quiet_targets() {
    let filter = build_filter(&LoggerConfig::default());
    let rendered = filter.to_string();
    assert!(rendered.contains("hyper=warn"));
}
