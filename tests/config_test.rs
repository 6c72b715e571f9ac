use realtime_cost::config::{Config, OutputFormat};
use realtime_cost::NoncachedPolicy;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_default_config_values() {
    let config = Config::default();

    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, "pretty");
    assert_eq!(config.logging.output, "console");
    assert_eq!(config.processing.parallel_chunks, 1);
    assert_eq!(config.accounting.noncached_policy(), NoncachedPolicy::Signed);
    assert_eq!(config.output.format, OutputFormat::Text);

    let names: Vec<_> = config.pricing.iter().map(|t| t.name.clone()).collect();
    assert_eq!(names, vec!["gpt-rt", "gpt-mini-rt"]);
}

#[test]
#[serial]
fn test_env_variable_override() {
    env::set_var("LOG_LEVEL", "debug");
    env::set_var("REALTIME_COST_PARALLEL_CHUNKS", "8");
    env::set_var("REALTIME_COST_CLAMP_NEGATIVE", "true");
    env::set_var("REALTIME_COST_OUTPUT_FORMAT", "json");

    let mut config = Config::default();
    let result = config.apply_env_overrides();

    env::remove_var("LOG_LEVEL");
    env::remove_var("REALTIME_COST_PARALLEL_CHUNKS");
    env::remove_var("REALTIME_COST_CLAMP_NEGATIVE");
    env::remove_var("REALTIME_COST_OUTPUT_FORMAT");

    result.expect("Failed to apply env overrides");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.processing.parallel_chunks, 8);
    assert!(config.accounting.clamp_negative_noncached);
    assert_eq!(config.output.format, OutputFormat::Json);
}

#[test]
#[serial]
fn test_invalid_env_value() {
    env::set_var("REALTIME_COST_PARALLEL_CHUNKS", "many");
    let mut config = Config::default();
    let result = config.apply_env_overrides();
    env::remove_var("REALTIME_COST_PARALLEL_CHUNKS");

    assert!(result.is_err());
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.processing.parallel_chunks = 0;
    assert!(config.validate().is_err());

    config = Config::default();
    config.logging.output = "syslog".to_string();
    assert!(config.validate().is_err());

    config = Config::default();
    config.pricing.tables[0].table.audio_output = -5.0;
    assert!(config.validate().is_err());
}

#[cfg(feature = "basic")]
#[test]
fn test_config_file_loading() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("test-config.toml");

    let test_config = r#"
[logging]
level = "debug"
format = "json"

[accounting]
clamp_negative_noncached = true

[output]
format = "json"
json_pretty = true

[[pricing.tables]]
name = "standard"
audio_input = 40
cached_audio_input = 2.5
audio_output = 80
text_input = 5
cached_text_input = 2.5
text_output = 20
"#;
    fs::write(&config_path, test_config).expect("Failed to write test config");

    let config = Config::load_from_file(&config_path).expect("Failed to load config");

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    // Unspecified keys keep their defaults.
    assert_eq!(config.logging.output, "console");
    assert_eq!(config.processing.parallel_chunks, 1);
    assert_eq!(config.accounting.noncached_policy(), NoncachedPolicy::ClampToZero);
    assert!(config.output.json_pretty);

    assert_eq!(config.pricing.len(), 1);
    let standard = config.pricing.get("standard").unwrap();
    assert_eq!(standard.audio_input, 40.0);
    assert_eq!(standard.cached_text_input, 2.5);
    assert!(config.validate().is_ok());
}

#[cfg(feature = "basic")]
#[test]
fn test_config_save_and_reload() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("saved.toml");

    let mut config = Config::default();
    config.accounting.clamp_negative_noncached = true;
    config.save_to_file(&path).expect("Failed to save config");

    let reloaded = Config::load_from_file(&path).expect("Failed to reload config");
    assert_eq!(reloaded, config);
}

#[cfg(feature = "basic")]
#[test]
fn test_malformed_config_file() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("bad.toml");
    fs::write(&path, "[logging\nlevel = ").unwrap();

    assert!(Config::load_from_file(&path).is_err());
}
