// src/formatting.rs

use crate::core::Alert;
use serde_json::{json, Value};

/// Returns the emoji used to mark an alert of the given severity.
pub fn severity_emoji(severity: &str) -> &'static str {
    match severity.to_lowercase().as_str() {
        "critical" => "🔴",
        "high" => "🟠",
        "medium" => "🟡",
        "low" => "🟢",
        "info" => "ℹ️",
        _ => "⚪",
    }
}

/// Renders a single alert as Block Kit blocks for the alert channel.
pub fn format_alert_blocks(alert: &Alert) -> Vec<Value> {
    let emoji = severity_emoji(&alert.severity);

    vec![
        json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("{} New Alert: {}", emoji, alert.service),
                "emoji": true
            }
        }),
        json!({
            "type": "section",
            "fields": [
                {
                    "type": "mrkdwn",
                    "text": format!("*Severity:*\n{}", alert.severity.to_uppercase())
                },
                {
                    "type": "mrkdwn",
                    "text": format!("*Service:*\n{}", alert.service)
                }
            ]
        }),
        json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("*Message:*\n{}", alert.message)
            }
        }),
        json!({
            "type": "context",
            "elements": [
                {
                    "type": "mrkdwn",
                    "text": format!("Alert ID: {} | {}", alert.id, alert.timestamp_rfc3339())
                }
            ]
        }),
    ]
}

/// Plain-text fallback shown in notifications that cannot render blocks.
pub fn alert_fallback_text(alert: &Alert) -> String {
    format!("New {} alert from {}", alert.severity, alert.service)
}

/// Renders the dashboard (App Home) view for the given alerts.
///
/// At most `max_rendered` alerts get their own section; the rest are
/// summarised in a trailing line.
pub fn format_dashboard_view(alerts: &[Alert], max_rendered: usize) -> Value {
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": "🚨 Alert Dashboard",
                "emoji": true
            }
        }),
        json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("*Active Alerts:* {}", alerts.len())
            }
        }),
        json!({ "type": "divider" }),
    ];

    if alerts.is_empty() {
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": "✅ _No active alerts. All systems operational._"
            }
        }));
    } else {
        for alert in alerts.iter().take(max_rendered) {
            blocks.push(json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "{} *{}* - {}\n{}",
                        severity_emoji(&alert.severity),
                        alert.service,
                        alert.severity.to_uppercase(),
                        alert.message
                    )
                }
            }));
            blocks.push(json!({
                "type": "context",
                "elements": [
                    {
                        "type": "mrkdwn",
                        "text": format!("ID: {} | {}", alert.id, alert.timestamp_rfc3339())
                    }
                ]
            }));
            blocks.push(json!({ "type": "divider" }));
        }

        if alerts.len() > max_rendered {
            blocks.push(json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!("_... and {} more alerts_", alerts.len() - max_rendered)
                }
            }));
        }
    }

    json!({
        "type": "home",
        "blocks": blocks
    })
}
