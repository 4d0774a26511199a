//! HTTP webhook, listing and health endpoints.

use super::error::{IngressError, VALID_SEVERITIES};
use super::{command::AlertParams, AppState};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let store = state.service.store();
    Json(json!({
        "status": "healthy",
        "alert_count": store.count(),
        "active_alerts": store.active_count(),
        "stub_mode": state.stub_mode,
    }))
}

/// `POST /webhook/alert` with `{"service", "severity", "message"}`.
pub async fn create_alert(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, IngressError> {
    let params = match payload {
        Ok(Json(value)) => parse_webhook_payload(&value),
        Err(rejection) => Err(IngressError::MalformedPayload(rejection.body_text())),
    }
    .inspect_err(|e| warn!("Rejected webhook alert: {}", e))?;

    let alert = state
        .service
        .create_alert(&params.service, &params.severity, &params.message)
        .await;
    info!(id = alert.id, "Alert created via webhook");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "alert_id": alert.id,
            "alert": alert,
        })),
    ))
}

/// Validates a webhook body and extracts the alert fields.
pub fn parse_webhook_payload(value: &Value) -> Result<AlertParams, IngressError> {
    let object = match value.as_object() {
        Some(object) if !object.is_empty() => object,
        _ => return Err(IngressError::EmptyPayload),
    };

    let missing: Vec<&'static str> = ["service", "severity", "message"]
        .into_iter()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(IngressError::MissingFields(missing));
    }

    let field = |name: &'static str| {
        object[name]
            .as_str()
            .map(str::to_string)
            .ok_or(IngressError::NotAString(name))
    };
    let params = AlertParams {
        service: field("service")?,
        severity: field("severity")?,
        message: field("message")?,
    };

    if !VALID_SEVERITIES.contains(&params.severity.to_lowercase().as_str()) {
        return Err(IngressError::InvalidSeverity);
    }
    Ok(params)
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

/// `GET /alerts?limit=N`: active alerts, newest first.
pub async fn list_alerts(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, IngressError> {
    let Query(params) = query
        .map_err(|rejection| IngressError::InvalidQuery(rejection.body_text()))
        .inspect_err(|e| warn!("Rejected alert listing: {}", e))?;
    let limit = params.limit.unwrap_or(state.default_list_limit);
    let alerts: Vec<_> = state
        .service
        .store()
        .active_alerts()
        .into_iter()
        .take(limit)
        .collect();

    Ok(Json(json!({
        "success": true,
        "count": alerts.len(),
        "alerts": alerts,
    })))
}
