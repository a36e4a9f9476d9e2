use csvscope::config::{AppConfig, ConfigManager};
use csvscope::registry::default_palette;
use csvscope::LabelMode;
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

fn write_user_config(manager: &ConfigManager, content: &str) {
    manager
        .ensure_config_dir()
        .expect("Failed to create config dir");
    fs::write(manager.config_path("config.toml"), content).expect("Failed to write config");
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");
    assert_eq!(config.file_loading.delimiter, None);
    assert_eq!(config.file_loading.skip_rows, None);
    assert_eq!(config.plot.palette, default_palette());
    assert_eq!(config.plot.label_mode().unwrap(), LabelMode::FileCounter);
    assert!(config.plot.show_legend);
    assert_eq!(config.performance.event_poll_interval_ms, 25);
    assert_eq!(config.performance.max_points_per_series, 2000);
    assert!(!config.debug.enabled);
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[file_loading]"));
    assert!(template.contains("[plot]"));
    assert!(template.contains("[performance]"));
    assert!(template.contains("[theme.colors]"));
    assert!(template.contains("[debug]"));
    assert!(template.contains("version = \"0.1\""));
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");
    assert!(config_path.exists());

    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[plot]"));

    // A second write needs --force
    let result = config_manager.write_default_config(false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("already exists"));

    let again = config_manager
        .write_default_config(true)
        .expect("Write with force should succeed");
    assert_eq!(again, config_path);
}

#[test]
fn test_load_without_user_file_gives_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = AppConfig::load_from(&config_manager).expect("Should load defaults");
    assert_eq!(config.version, "0.1");
    assert_eq!(config.plot.palette, default_palette());
}

#[test]
fn test_user_config_overrides_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(
        &config_manager,
        r##"
version = "0.1"

[file_loading]
delimiter = ";"
skip_rows = 3

[plot]
palette = ["#000000", "#ffffff"]
label_mode = "second_column"

[performance]
max_points_per_series = 500
"##,
    );

    let config = AppConfig::load_from(&config_manager).expect("Should load user config");
    assert_eq!(config.file_loading.delimiter, Some(';'));
    assert_eq!(config.file_loading.skip_rows, Some(3));
    assert_eq!(config.plot.palette, vec!["#000000", "#ffffff"]);
    assert_eq!(config.plot.label_mode().unwrap(), LabelMode::SecondColumn);
    assert_eq!(config.performance.max_points_per_series, 500);

    // Unspecified values keep their defaults
    assert_eq!(config.plot.marker, "braille");
    assert_eq!(config.performance.event_poll_interval_ms, 25);
}

#[test]
fn test_invalid_user_config_is_rejected() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(&config_manager, "[plot]\nlabel_mode = \"rainbow\"\n");
    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("label_mode"));

    write_user_config(&config_manager, "this is not toml = = =");
    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_merge_configs() {
    let mut base = AppConfig::default();
    let mut override_config = AppConfig::default();

    override_config.plot.marker = "dot".to_string();
    override_config.performance.event_poll_interval_ms = 50;
    override_config.theme.colors.primary = "blue".to_string();

    base.merge(override_config);

    assert_eq!(base.plot.marker, "dot");
    assert_eq!(base.performance.event_poll_interval_ms, 50);
    assert_eq!(base.theme.colors.primary, "blue");

    // Untouched values remain default
    assert_eq!(base.theme.colors.secondary, "yellow");
    assert_eq!(base.plot.palette, default_palette());
}

#[test]
fn test_validate_config_valid() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_validate_config_invalid_version() {
    let config = AppConfig {
        version: "1.0".to_string(),
        ..AppConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Unsupported config version"));
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = AppConfig::default();
    config.performance.event_poll_interval_ms = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.performance.max_points_per_series = 1;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.plot.palette.clear();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.plot.palette = vec!["blue".to_string()];
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.plot.marker = "star".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.file_loading.compression = Some("rar".to_string());
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.theme.colors.error = "not_a_color".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("'error'"));
}
