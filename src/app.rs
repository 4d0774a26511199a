//! The main application logic, decoupled from the entry point.

use crate::{
    config::Config,
    core::NotificationSink,
    ingress::{self, AppState, IngressServer},
    internal_metrics::MetricsBuilder,
    notification::{SlackSink, StubSink},
    service::AlertService,
    store::AlertStore,
};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

/// A handle to the running application.
pub struct App {
    local_addr: SocketAddr,
    service: Arc<AlertService>,
    server_handle: JoinHandle<()>,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    /// The address the ingress server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The service shared by every ingress adapter.
    pub fn service(&self) -> Arc<AlertService> {
        self.service.clone()
    }

    /// Waits until the server has shut down.
    pub async fn run(self) -> Result<()> {
        if let Err(e) = self.server_handle.await {
            error!("Ingress server task panicked: {:?}", e);
            return Err(e.into());
        }
        info!("All tasks shut down.");
        Ok(())
    }
}

/// Builder for the main application.
///
/// Separates constructing the components from running them, and lets tests
/// swap the notification sink.
pub struct AppBuilder {
    config: Config,
    sink_override: Option<Arc<dyn NotificationSink>>,
}

impl AppBuilder {
    /// Creates a new `AppBuilder` with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sink_override: None,
        }
    }

    /// Overrides the notification sink for testing.
    pub fn sink_override(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink_override = Some(sink);
        self
    }

    /// Builds all components, binds the listener and starts serving.
    #[instrument(skip_all)]
    pub async fn build(self, shutdown_rx: watch::Receiver<bool>) -> Result<App> {
        let config = self.config;

        // =========================================================================
        // 1. Initialize Metrics
        // =========================================================================
        let prometheus = MetricsBuilder::new(config.metrics.clone()).build();

        // =========================================================================
        // 2. Notification Sink
        // =========================================================================
        let sink: Arc<dyn NotificationSink> = match self.sink_override {
            Some(sink) => sink,
            None if config.stub_mode => Arc::new(StubSink::new(config.slack.alert_channel.clone())),
            None => Arc::new(
                SlackSink::new(&config.slack, config.dashboard.max_rendered_alerts)
                    .context("Failed to create Slack sink")?,
            ),
        };
        info!("Notification sink: {}", sink.name());

        // =========================================================================
        // 3. Store and Service
        // =========================================================================
        let store = Arc::new(AlertStore::new());
        let service = Arc::new(AlertService::new(store, sink));

        // =========================================================================
        // 4. Ingress Server
        // =========================================================================
        let state = AppState {
            service: service.clone(),
            stub_mode: config.stub_mode,
            alert_channel: config.slack.alert_channel.clone(),
            default_list_limit: config.dashboard.default_list_limit,
            signing_secret: config
                .slack
                .signing_secret
                .clone()
                .filter(|secret| !secret.trim().is_empty()),
            prometheus,
        };
        let bind_addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(bind_addr.as_str())
            .await
            .with_context(|| format!("Failed to bind ingress server to {}", bind_addr))?;
        let local_addr = listener.local_addr()?;

        let server = IngressServer::new(listener, ingress::router(state), shutdown_rx);
        let server_handle = tokio::spawn(server.run());
        info!("Ingress server listening on {}", local_addr);

        Ok(App {
            local_addr,
            service,
            server_handle,
        })
    }
}
