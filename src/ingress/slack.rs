//! Slack-facing ingress: slash commands and Events API callbacks.

use super::command::parse_alert_command;
use super::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

const USAGE: &str = "Usage: `/alert service=<name> severity=<level> message=<text>`\n\
                     Example: `/alert service=api severity=high message=Response time critical`";

/// The subset of a slash command payload this adapter reads.
#[derive(Debug, Deserialize)]
pub struct SlashCommand {
    pub command: String,
    #[serde(default)]
    pub text: String,
    pub user_id: String,
}

fn ephemeral(text: String) -> Json<Value> {
    Json(json!({
        "response_type": "ephemeral",
        "text": text,
    }))
}

/// `POST /slack/commands`, form encoded.
pub async fn slash_command(
    State(state): State<AppState>,
    Form(cmd): Form<SlashCommand>,
) -> Json<Value> {
    if cmd.command != "/alert" {
        warn!(command = %cmd.command, "Unknown slash command");
        return ephemeral(format!("Unknown command `{}`.", cmd.command));
    }

    let text = cmd.text.trim();
    if text.is_empty() {
        return ephemeral(USAGE.to_string());
    }

    let Some(params) = parse_alert_command(text) else {
        debug!(text, "Could not parse /alert text");
        return ephemeral(
            "❌ Invalid format. Use: `/alert service=<name> severity=<level> message=<text>`"
                .to_string(),
        );
    };

    let alert = state
        .service
        .create_alert(&params.service, &params.severity, &params.message)
        .await;
    // The invoking user sees the new alert even if they never opened the dashboard.
    state.service.refresh_viewer(&cmd.user_id).await;

    let headline = if state.stub_mode {
        format!("✅ [STUB MODE] Alert created (ID: {})", alert.id)
    } else {
        format!(
            "✅ Alert created and posted to <#{}> (ID: {})",
            state.alert_channel, alert.id
        )
    };
    ephemeral(format!(
        "{}\nService: `{}` | Severity: `{}`\nMessage: {}",
        headline, alert.service, alert.severity, alert.message
    ))
}

/// `POST /slack/events`, Events API JSON.
pub async fn events(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    match body["type"].as_str() {
        Some("url_verification") => {
            Json(json!({ "challenge": body["challenge"] })).into_response()
        }
        Some("event_callback") => {
            let event = &body["event"];
            match (event["type"].as_str(), event["user"].as_str()) {
                (Some("app_home_opened"), Some(user)) => {
                    state.service.register_viewer(user);
                    info!("Recorded dashboard viewer: {}", user);
                    state.service.refresh_viewer(user).await;
                }
                (kind, _) => debug!(?kind, "Ignoring Slack event"),
            }
            StatusCode::OK.into_response()
        }
        other => {
            debug!(?other, "Ignoring Slack payload");
            StatusCode::OK.into_response()
        }
    }
}
