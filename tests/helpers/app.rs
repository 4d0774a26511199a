#![allow(dead_code)]
//! Test helpers for running the full application instance.

use alertbot::{
    app::App, config::Config, notification::test_utils::RecordingSink, service::AlertService,
};
use anyhow::Result;
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle, time::timeout};

/// A configuration suitable for tests: stub mode, an ephemeral port on
/// loopback and no global metrics recorder.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.stub_mode = true;
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.metrics.enabled = false;
    config
}

/// Represents a running instance of the application for testing purposes.
pub struct TestApp {
    pub addr: SocketAddr,
    pub service: Arc<AlertService>,
    pub client: reqwest::Client,
    shutdown_tx: watch::Sender<bool>,
    app_handle: JoinHandle<Result<()>>,
}

impl TestApp {
    /// Starts the app with the given sink in place of Slack.
    pub async fn spawn_with_sink(sink: Arc<RecordingSink>) -> Result<Self> {
        Self::spawn_with(App::builder(test_config()).sink_override(sink)).await
    }

    /// Starts the app exactly as configured, with no overrides.
    pub async fn spawn_with_config(config: Config) -> Result<Self> {
        Self::spawn_with(App::builder(config)).await
    }

    async fn spawn_with(builder: alertbot::app::AppBuilder) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let app = builder.build(shutdown_rx).await?;
        let addr = app.local_addr();
        let service = app.service();
        let app_handle = tokio::spawn(app.run());

        Ok(Self {
            addr,
            service,
            client: reqwest::Client::new(),
            shutdown_tx,
            app_handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_alert(&self, body: &Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/webhook/alert"))
            .json(body)
            .send()
            .await?)
    }

    pub async fn post_event(&self, body: &Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/slack/events"))
            .json(body)
            .send()
            .await?)
    }

    pub async fn get_json(&self, path: &str) -> Result<Value> {
        Ok(self.client.get(self.url(path)).send().await?.json().await?)
    }

    /// Shuts down the application and waits for it to terminate.
    /// Fails if the application does not shut down within the specified timeout.
    pub async fn shutdown(self, timeout_duration: Duration) -> Result<()> {
        self.shutdown_tx.send(true)?;
        match timeout(timeout_duration, self.app_handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(anyhow::anyhow!("App failed to shut down within the timeout")),
        }
    }
}

/// Builds the Events API payload Slack sends when a user opens the app home.
pub fn home_opened(user: &str) -> Value {
    serde_json::json!({
        "type": "event_callback",
        "event": { "type": "app_home_opened", "user": user },
    })
}
