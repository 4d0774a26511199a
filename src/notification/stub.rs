//! A sink that only logs what it would have sent.
//!
//! Used in stub mode so the whole ingress path can be exercised without
//! Slack credentials.

use crate::core::{Alert, NotificationError, NotificationSink};
use async_trait::async_trait;
use tracing::info;

pub struct StubSink {
    alert_channel: String,
}

impl StubSink {
    pub fn new(alert_channel: impl Into<String>) -> Self {
        Self {
            alert_channel: alert_channel.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for StubSink {
    fn name(&self) -> &str {
        "stub"
    }

    async fn broadcast(&self, alert: &Alert) -> Result<(), NotificationError> {
        info!("[STUB] Would post alert to #{}:", self.alert_channel);
        info!(?alert, "[STUB] Alert");
        Ok(())
    }

    async fn publish_view(
        &self,
        viewer_id: &str,
        alerts: &[Alert],
    ) -> Result<(), NotificationError> {
        info!(
            "[STUB] Would update dashboard for user {} with {} alerts",
            viewer_id,
            alerts.len()
        );
        Ok(())
    }
}
