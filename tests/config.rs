use alertbot::cli::Cli;
use alertbot::config::{Config, ConfigError};
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
#[serial]
fn test_load_full_valid_config() {
    let file = write_config(
        r#"
        log_level = "debug"
        stub_mode = false
        [slack]
        bot_token = "xoxb-1"
        signing_secret = "shh"
        alert_channel = "ops"
        timeout_seconds = 3
        [server]
        host = "127.0.0.1"
        port = 8088
        [dashboard]
        max_rendered_alerts = 5
        [metrics]
        enabled = false
    "#,
    );

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = Config::load(&cli).unwrap();

    assert_eq!(config.log_level, "debug");
    assert!(!config.stub_mode);
    assert_eq!(config.slack.bot_token.as_deref(), Some("xoxb-1"));
    assert_eq!(config.slack.alert_channel, "ops");
    assert_eq!(config.slack.timeout_seconds, 3);
    // Not in the file, so it keeps the default.
    assert_eq!(config.slack.api_base_url, "https://slack.com/api");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8088);
    assert_eq!(config.dashboard.max_rendered_alerts, 5);
    assert!(!config.metrics.enabled);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_cli_arguments_override_file() {
    let file = write_config(
        r#"
        [server]
        port = 8088
    "#,
    );

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        port: Some(9099),
        stub: true,
        ..Default::default()
    };
    let config = Config::load(&cli).unwrap();

    assert_eq!(config.server.port, 9099);
    assert!(config.stub_mode);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    let cli = Cli {
        config: Some("/nonexistent/alertbot.toml".into()),
        ..Default::default()
    };
    let config = Config::load(&cli).unwrap();

    assert_eq!(config.server.port, 3000);
    assert_eq!(config.slack.alert_channel, "alerts");
    assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
}

#[test]
#[serial]
fn test_environment_overrides_nested_keys() {
    std::env::set_var("ALERTBOT_DASHBOARD__DEFAULT_LIST_LIMIT", "7");
    let file = write_config("");

    let config = Config::load_from_file(file.path()).unwrap();
    std::env::remove_var("ALERTBOT_DASHBOARD__DEFAULT_LIST_LIMIT");

    assert_eq!(config.dashboard.default_list_limit, 7);
}

#[test]
#[serial]
fn test_invalid_value_type_is_an_error() {
    let file = write_config(
        r#"
        [server]
        port = "not-a-port"
    "#,
    );
    assert!(Config::load_from_file(file.path()).is_err());
}
