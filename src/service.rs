//! The alert service: the one entry point that creates alerts.
//!
//! `AlertService` records an alert in the `AlertStore`, broadcasts it through
//! the `NotificationSink`, then refreshes every registered dashboard viewer.
//! Sink failures are logged and counted at the call site and never reach the
//! caller; the alert is recorded whether or not anyone could be notified.

use crate::core::{Alert, NotificationSink};
use crate::internal_metrics::{Metrics, NotificationKind};
use crate::store::AlertStore;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, instrument};

/// Coordinates alert creation with notification fan-out.
pub struct AlertService {
    store: Arc<AlertStore>,
    sink: Arc<dyn NotificationSink>,
    // Guarded separately from the store so a slow fan-out never blocks
    // alert creation or store reads.
    viewers: Mutex<HashSet<String>>,
    metrics: Metrics,
}

impl AlertService {
    /// Creates a new `AlertService` with an empty viewer set.
    pub fn new(store: Arc<AlertStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            sink,
            viewers: Mutex::new(HashSet::new()),
            metrics: Metrics::new(),
        }
    }

    /// The store backing this service, for read-only queries.
    pub fn store(&self) -> &Arc<AlertStore> {
        &self.store
    }

    fn viewers(&self) -> MutexGuard<'_, HashSet<String>> {
        self.viewers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records an alert, broadcasts it and refreshes every viewer.
    ///
    /// Always returns the newly created alert. Identical calls create
    /// distinct alerts; there is no deduplication.
    #[instrument(skip(self, message))]
    pub async fn create_alert(&self, service: &str, severity: &str, message: &str) -> Alert {
        let alert = self.store.add(service, severity, message);
        self.metrics.record_alert_created(self.store.count());
        info!("Created alert {}: {} - {}", alert.id, service, severity);

        self.broadcast(&alert).await;
        self.refresh_all_viewers().await;

        alert
    }

    async fn broadcast(&self, alert: &Alert) {
        match self.sink.broadcast(alert).await {
            Ok(()) => {
                self.metrics
                    .record_notification(NotificationKind::Broadcast, true);
                debug!(id = alert.id, sink = self.sink.name(), "Alert broadcast");
            }
            Err(e) => {
                self.metrics
                    .record_notification(NotificationKind::Broadcast, false);
                error!(
                    target_kind = "broadcast",
                    id = alert.id,
                    sink = self.sink.name(),
                    "Failed to broadcast alert: {}",
                    e
                );
            }
        }
    }

    /// Adds a viewer to the refresh set. Registering twice is a no-op, and
    /// registration alone does not trigger a refresh.
    pub fn register_viewer(&self, viewer_id: &str) {
        let count = {
            let mut viewers = self.viewers();
            if !viewers.insert(viewer_id.to_string()) {
                return;
            }
            viewers.len()
        };
        self.metrics.set_viewers_registered(count);
        info!(viewer_id, total_viewers = count, "Registered dashboard viewer");
    }

    /// The number of registered viewers.
    pub fn viewer_count(&self) -> usize {
        self.viewers().len()
    }

    /// Publishes the current active alerts to one viewer.
    ///
    /// A failure is logged with the viewer id and otherwise ignored.
    pub async fn refresh_viewer(&self, viewer_id: &str) {
        let alerts = self.store.active_alerts();
        match self.sink.publish_view(viewer_id, &alerts).await {
            Ok(()) => {
                self.metrics.record_notification(NotificationKind::View, true);
                debug!(viewer_id, alerts = alerts.len(), "Refreshed dashboard");
            }
            Err(e) => {
                self.metrics
                    .record_notification(NotificationKind::View, false);
                error!(
                    viewer_id,
                    sink = self.sink.name(),
                    "Failed to refresh dashboard for viewer {}: {}",
                    viewer_id,
                    e
                );
            }
        }
    }

    /// Refreshes every registered viewer.
    ///
    /// Works from a snapshot of the viewer set, so viewers registered during
    /// the fan-out are picked up by the next one. Each viewer is refreshed
    /// independently; one failure never stops the others.
    pub async fn refresh_all_viewers(&self) {
        let snapshot: Vec<String> = self.viewers().iter().cloned().collect();
        if snapshot.is_empty() {
            debug!("No dashboard viewers recorded yet");
            return;
        }

        info!("Refreshing dashboards for {} viewers", snapshot.len());
        join_all(snapshot.iter().map(|viewer_id| self.refresh_viewer(viewer_id))).await;
    }
}
