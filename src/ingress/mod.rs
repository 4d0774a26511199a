//! # Ingress
//!
//! The `axum` server through which alerts enter the system. It exposes the
//! JSON webhook, the Slack slash command and Events API callbacks, read-only
//! listing and health routes, and `/metrics` when Prometheus is enabled.
//!
//! Every handler funnels into the shared [`AlertService`]; validation of
//! external input happens here and nowhere deeper. The Slack routes sit
//! behind [`signature::verify_slack_signature`].

pub mod command;
pub mod error;
pub mod signature;
pub mod slack;
pub mod webhook;

use crate::service::AlertService;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, trace};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AlertService>,
    pub stub_mode: bool,
    pub alert_channel: String,
    pub default_list_limit: usize,
    /// Slack signing secret; `None` leaves the Slack routes unauthenticated.
    pub signing_secret: Option<String>,
    pub prometheus: Option<PrometheusHandle>,
}

/// Builds the ingress router.
pub fn router(state: AppState) -> Router {
    let slack_routes = Router::new()
        .route("/slack/commands", post(slack::slash_command))
        .route("/slack/events", post(slack::events))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            signature::verify_slack_signature,
        ));

    let mut router = Router::new()
        .route("/health", get(webhook::health))
        .route("/webhook/alert", post(webhook::create_alert))
        .route("/alerts", get(webhook::list_alerts))
        .merge(slack_routes);

    if let Some(handle) = state.prometheus.clone() {
        router = router.route("/metrics", get(move || async move { handle.render() }));
    }

    router.with_state(state)
}

/// Serves the ingress router until the shutdown signal flips.
pub struct IngressServer {
    listener: TcpListener,
    router: Router,
    shutdown_rx: watch::Receiver<bool>,
}

impl IngressServer {
    /// Creates a new `IngressServer` but does not spawn it.
    ///
    /// # Arguments
    ///
    /// * `listener` - A `TcpListener` that has already been bound to an address.
    /// * `router` - The router built by [`router`].
    /// * `shutdown_rx` - A watch channel receiver for graceful shutdown.
    pub fn new(listener: TcpListener, router: Router, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            listener,
            router,
            shutdown_rx,
        }
    }

    /// Returns a future that runs the server until a shutdown signal is received.
    pub fn run(self) -> impl Future<Output = ()> {
        let mut shutdown_rx = self.shutdown_rx;
        let shutdown = async move {
            // A dropped sender also counts as shutdown.
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
            trace!("Ingress server received shutdown signal.");
        };

        async move {
            if let Err(e) = axum::serve(self.listener, self.router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("Ingress server error: {}", e);
            }
            trace!("Ingress server task finished.");
        }
    }
}
