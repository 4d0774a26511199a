//! Configuration management for AlertBot
//!
//! This module defines the main `Config` struct and its sub-structs. It uses
//! the `figment` crate to layer built-in defaults, an `alertbot.toml` file,
//! `ALERTBOT_`-prefixed environment variables and command-line arguments.

use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// The configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "alertbot.toml";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Log notifications instead of calling Slack.
    pub stub_mode: bool,
    /// Slack credentials and delivery settings.
    pub slack: SlackConfig,
    /// Listener settings for the ingress HTTP server.
    pub server: ServerConfig,
    /// Rendering limits for dashboards and listings.
    pub dashboard: DashboardConfig,
    /// Configuration for the Prometheus exporter.
    pub metrics: MetricsConfig,
}

/// Slack credentials and delivery settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SlackConfig {
    /// Bot token (`xoxb-...`) used for Web API calls.
    pub bot_token: Option<String>,
    /// Signing secret used to verify inbound Slack requests.
    pub signing_secret: Option<String>,
    /// Channel that receives every new alert.
    pub alert_channel: String,
    /// Base URL of the Slack Web API.
    pub api_base_url: String,
    /// Timeout for a single Web API request, in seconds.
    pub timeout_seconds: u64,
}

/// Listener settings for the ingress HTTP server.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Rendering limits for dashboards and listings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DashboardConfig {
    /// Alerts rendered individually on a dashboard before summarising the rest.
    pub max_rendered_alerts: usize,
    /// Default `limit` for `GET /alerts`.
    pub default_list_limit: usize,
}

/// Configuration for the Prometheus exporter.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
}

/// Problems found by [`Config::validate`].
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("slack.alert_channel must not be empty")]
    EmptyAlertChannel,
}

impl Config {
    /// Loads the configuration, layering defaults, the TOML file, the
    /// environment and the command-line arguments in that order.
    pub fn load(cli: &Cli) -> Result<Self> {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let config = Self::figment(&path).merge(cli).extract()?;
        Ok(config)
    }

    /// Loads the configuration from a file and the environment only.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Ok(Self::figment(path).extract()?)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            // e.g. ALERTBOT_STUB_MODE=true, ALERTBOT_SLACK__BOT_TOKEN=xoxb-...
            .merge(Env::prefixed("ALERTBOT_").split("__"))
    }

    /// Checks that the settings needed to talk to Slack are present.
    ///
    /// In stub mode no credentials are required. Without a signing secret
    /// the Slack routes accept unsigned requests.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.stub_mode {
            let mut missing = Vec::new();
            if is_unset(&self.slack.bot_token) {
                missing.push("slack.bot_token");
            }
            if is_unset(&self.slack.signing_secret) {
                missing.push("slack.signing_secret");
            }
            if !missing.is_empty() {
                return Err(ConfigError::Missing(missing));
            }
        }

        if self.slack.alert_channel.trim().is_empty() {
            return Err(ConfigError::EmptyAlertChannel);
        }
        Ok(())
    }

    /// Logs the non-secret settings.
    pub fn log_summary(&self) {
        info!("-------------------- Configuration --------------------");
        info!("Log Level: {}", self.log_level);
        info!("Listen Address: {}:{}", self.server.host, self.server.port);
        info!("Alert Channel: #{}", self.slack.alert_channel);
        info!("Stub Mode: {}", self.stub_mode);
        info!(
            "Dashboard Alert Limit: {}",
            self.dashboard.max_rendered_alerts
        );
        info!("Default List Limit: {}", self.dashboard.default_list_limit);
        info!(
            "Metrics: {}",
            if self.metrics.enabled { "Enabled" } else { "Disabled" }
        );
        info!("-------------------------------------------------------");
    }
}

fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stub_mode: false,
            slack: SlackConfig {
                bot_token: None,
                signing_secret: None,
                alert_channel: "alerts".to_string(),
                api_base_url: "https://slack.com/api".to_string(),
                timeout_seconds: 10,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            dashboard: DashboardConfig {
                max_rendered_alerts: 20,
                default_list_limit: 50,
            },
            metrics: MetricsConfig { enabled: true },
        }
    }
}
