//! In-memory alert storage.
//!
//! The `AlertStore` is the single source of truth for alert records during a
//! session. One mutex guards both the record sequence and the identity
//! counter, and every read hands back an owned copy so callers never alias
//! stored state.

use crate::core::{Alert, AlertStatus};
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct StoreInner {
    alerts: Vec<Alert>,
    last_id: u64,
}

/// Thread-safe, append-only registry of alerts.
#[derive(Debug, Default)]
pub struct AlertStore {
    inner: Mutex<StoreInner>,
}

impl AlertStore {
    /// Creates an empty store. The first alert added receives id 1.
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a half-written record
    // behind (the push is the last step), so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records a new alert and returns a copy of it.
    ///
    /// Never fails. Inputs are stored verbatim; validation belongs to the
    /// ingress adapters.
    pub fn add(&self, service: &str, severity: &str, message: &str) -> Alert {
        let mut inner = self.lock();
        inner.last_id += 1;

        // Wall clocks can step backwards; keep timestamps non-decreasing in
        // insertion order.
        let now = Utc::now();
        let timestamp = match inner.alerts.last() {
            Some(prev) if prev.timestamp > now => prev.timestamp,
            _ => now,
        };

        let alert = Alert {
            id: inner.last_id,
            service: service.to_string(),
            severity: severity.to_string(),
            message: message.to_string(),
            timestamp,
            status: AlertStatus::Active,
        };
        inner.alerts.push(alert.clone());
        debug!(id = alert.id, service, severity, "Stored alert");
        alert
    }

    /// Returns every alert, newest first.
    pub fn all_alerts(&self) -> Vec<Alert> {
        self.lock().alerts.iter().rev().cloned().collect()
    }

    /// Returns the active alerts, newest first.
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.lock()
            .alerts
            .iter()
            .rev()
            .filter(|a| a.is_active())
            .cloned()
            .collect()
    }

    /// Total number of alerts ever added.
    pub fn count(&self) -> usize {
        self.lock().alerts.len()
    }

    /// Number of alerts whose status is active.
    pub fn active_count(&self) -> usize {
        self.lock().alerts.iter().filter(|a| a.is_active()).count()
    }

    /// Looks up an alert by id. Returns `None` for unknown ids.
    pub fn by_id(&self, id: u64) -> Option<Alert> {
        self.lock().alerts.iter().find(|a| a.id == id).cloned()
    }
}
