//! # Internal Metrics
//!
//! Metrics are emitted through the `metrics` facade. When enabled, the
//! `MetricsBuilder` installs a Prometheus recorder and hands back the
//! `PrometheusHandle` that the ingress router renders on `GET /metrics`.
//!
//! Without an installed recorder every call here is a no-op, which is what
//! unit tests rely on.

use crate::config::MetricsConfig;
use metrics::Unit;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{error, info};

/// Which side of the fan-out a notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Broadcast,
    View,
}

impl NotificationKind {
    fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Broadcast => "broadcast",
            NotificationKind::View => "view",
        }
    }
}

/// The public API for the metrics system.
#[derive(Clone, Debug, Default)]
pub struct Metrics;

impl Metrics {
    /// Registers descriptions for all supported metrics with the current recorder.
    pub fn new() -> Self {
        metrics::describe_counter!("alerts_created_total", Unit::Count, "Total number of alerts recorded by the store.");
        metrics::describe_counter!("notifications_sent_total", Unit::Count, "Notifications delivered by the sink, labeled by kind.");
        metrics::describe_counter!("notification_failures_total", Unit::Count, "Notifications the sink failed to deliver, labeled by kind.");
        metrics::describe_gauge!("alerts_stored", Unit::Count, "The number of alerts currently held in memory.");
        metrics::describe_gauge!("viewers_registered", Unit::Count, "The number of dashboard viewers receiving refreshes.");
        Self
    }

    pub fn record_alert_created(&self, stored: usize) {
        metrics::counter!("alerts_created_total").increment(1);
        metrics::gauge!("alerts_stored").set(stored as f64);
    }

    /// Records the outcome of one sink call.
    pub fn record_notification(&self, kind: NotificationKind, delivered: bool) {
        let name = if delivered {
            "notifications_sent_total"
        } else {
            "notification_failures_total"
        };
        metrics::counter!(name, "kind" => kind.as_str()).increment(1);
    }

    pub fn set_viewers_registered(&self, count: usize) {
        metrics::gauge!("viewers_registered").set(count as f64);
    }
}

/// Builder for the metrics system.
pub struct MetricsBuilder {
    config: MetricsConfig,
}

impl MetricsBuilder {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Installs the Prometheus recorder and returns its render handle.
    ///
    /// Returns `None` when metrics are disabled or a global recorder is
    /// already installed; the application keeps running either way.
    pub fn build(self) -> Option<PrometheusHandle> {
        if !self.config.enabled {
            return None;
        }

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        if let Err(e) = metrics::set_global_recorder(recorder) {
            error!("Failed to install Prometheus recorder: {}", e);
            return None;
        }

        Metrics::new();
        info!("Prometheus recorder installed, metrics served on /metrics");
        Some(handle)
    }
}
