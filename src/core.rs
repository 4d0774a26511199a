//! Core domain types and service traits for AlertBot
//!
//! This module defines the fundamental data structures and trait contracts
//! shared by the store, the service layer and the notification sinks.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Lifecycle state of an alert.
///
/// Only `Active` is ever produced; there is no resolution workflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Active,
}

/// A single operational alert reported by a service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    /// Sequential identity assigned by the store, starting at 1
    pub id: u64,
    /// Name of the service that raised the alert
    pub service: String,
    /// Free-form severity, kept exactly as the caller supplied it
    pub severity: String,
    /// Free-form message
    pub message: String,
    /// UTC creation time, rendered as RFC 3339 with a trailing `Z`
    #[serde(serialize_with = "serialize_utc")]
    pub timestamp: DateTime<Utc>,
    /// Current lifecycle state
    pub status: AlertStatus,
}

impl Alert {
    /// Returns `true` if the alert is still active.
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    /// The timestamp in the wire format used by every rendering of an alert.
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

fn serialize_utc<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Errors returned by a [`NotificationSink`].
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Slack API returned an error: {0}")]
    Api(String),

    #[error("{0}")]
    Other(String),
}

// =============================================================================
// Service Traits
// =============================================================================

/// Delivers alerts to the outside world.
///
/// The service layer never propagates these errors; it logs them where the
/// call is made and carries on.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// A short, descriptive name for the sink (e.g., "slack", "stub").
    fn name(&self) -> &str;

    /// Posts a single alert to the shared alert channel.
    async fn broadcast(&self, alert: &Alert) -> Result<(), NotificationError>;

    /// Publishes a dashboard view of `alerts` to one viewer.
    async fn publish_view(&self, viewer_id: &str, alerts: &[Alert])
        -> Result<(), NotificationError>;
}
