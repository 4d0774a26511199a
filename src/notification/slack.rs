//! A notification sink backed by the Slack Web API.

use crate::config::{ConfigError, SlackConfig};
use crate::core::{Alert, NotificationError, NotificationSink};
use crate::formatting::{alert_fallback_text, format_alert_blocks, format_dashboard_view};
use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info, instrument};

/// Posts alerts to a channel with `chat.postMessage` and publishes
/// dashboards with `views.publish`.
pub struct SlackSink {
    client: reqwest::Client,
    api_base_url: String,
    bot_token: String,
    alert_channel: String,
    max_rendered_alerts: usize,
}

impl SlackSink {
    /// Creates a new `SlackSink` from the Slack section of the configuration.
    ///
    /// Fails with [`ConfigError::Missing`] when no bot token is configured.
    pub fn new(config: &SlackConfig, max_rendered_alerts: usize) -> anyhow::Result<Self> {
        let bot_token = config
            .bot_token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing(vec!["slack.bot_token"]))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to build Slack HTTP client")?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            bot_token,
            alert_channel: config.alert_channel.clone(),
            max_rendered_alerts,
        })
    }

    /// Calls a Web API method and checks both the HTTP status and Slack's
    /// `ok` flag.
    async fn call(&self, method: &str, payload: &Value) -> Result<(), NotificationError> {
        let url = format!("{}/{}", self.api_base_url, method);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.bot_token)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, method, "HTTP request to Slack failed");
                NotificationError::from(e)
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!(
                status = %status,
                body = %body,
                method,
                "Slack returned a non-success status"
            );
            return Err(NotificationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = res.json().await?;
        if body["ok"].as_bool() != Some(true) {
            let reason = body["error"].as_str().unwrap_or("unknown_error");
            return Err(NotificationError::Api(reason.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for SlackSink {
    fn name(&self) -> &str {
        "slack"
    }

    #[instrument(skip(self, alert), fields(id = alert.id))]
    async fn broadcast(&self, alert: &Alert) -> Result<(), NotificationError> {
        let payload = json!({
            "channel": self.alert_channel,
            "text": alert_fallback_text(alert),
            "blocks": format_alert_blocks(alert),
        });
        self.call("chat.postMessage", &payload).await?;
        info!("Alert {} posted to #{}", alert.id, self.alert_channel);
        Ok(())
    }

    #[instrument(skip(self, alerts), fields(count = alerts.len()))]
    async fn publish_view(
        &self,
        viewer_id: &str,
        alerts: &[Alert],
    ) -> Result<(), NotificationError> {
        let payload = json!({
            "user_id": viewer_id,
            "view": format_dashboard_view(alerts, self.max_rendered_alerts),
        });
        self.call("views.publish", &payload).await?;
        info!(
            "Updated dashboard for user {} with {} alerts",
            viewer_id,
            alerts.len()
        );
        Ok(())
    }
}
