use crate::core::{Alert, NotificationError, NotificationSink};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// Fake sink for testing. Records every call and fails on request.
#[derive(Default)]
pub struct RecordingSink {
    broadcasts: Mutex<Vec<Alert>>,
    views: Mutex<Vec<(String, Vec<Alert>)>>,
    fail_broadcast: Mutex<bool>,
    failing_viewers: Mutex<HashSet<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent broadcast fail.
    pub fn fail_broadcasts(&self) {
        *self.fail_broadcast.lock().unwrap() = true;
    }

    /// Make every subsequent view published to `viewer_id` fail.
    pub fn fail_viewer(&self, viewer_id: &str) {
        self.failing_viewers
            .lock()
            .unwrap()
            .insert(viewer_id.to_string());
    }

    /// Alerts passed to `broadcast`, in call order.
    pub fn broadcasts(&self) -> Vec<Alert> {
        self.broadcasts.lock().unwrap().clone()
    }

    /// `(viewer_id, alerts)` pairs passed to `publish_view`, in call order.
    pub fn views(&self) -> Vec<(String, Vec<Alert>)> {
        self.views.lock().unwrap().clone()
    }

    /// The number of views published to one viewer.
    pub fn view_count_for(&self, viewer_id: &str) -> usize {
        self.views
            .lock()
            .unwrap()
            .iter()
            .filter(|(v, _)| v == viewer_id)
            .count()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn broadcast(&self, alert: &Alert) -> Result<(), NotificationError> {
        self.broadcasts.lock().unwrap().push(alert.clone());
        if *self.fail_broadcast.lock().unwrap() {
            return Err(NotificationError::Other("broadcast rejected".to_string()));
        }
        Ok(())
    }

    async fn publish_view(
        &self,
        viewer_id: &str,
        alerts: &[Alert],
    ) -> Result<(), NotificationError> {
        self.views
            .lock()
            .unwrap()
            .push((viewer_id.to_string(), alerts.to_vec()));
        if self.failing_viewers.lock().unwrap().contains(viewer_id) {
            return Err(NotificationError::Other(format!(
                "view rejected for {}",
                viewer_id
            )));
        }
        Ok(())
    }
}
