//! Verification of Slack's `v0` request signatures.
//!
//! Slack signs every slash command and Events API request with the app's
//! signing secret: `v0=` followed by the hex HMAC-SHA256 of
//! `v0:{timestamp}:{raw body}`. The middleware here checks that signature on
//! the raw body before any extractor parses it.

use super::error::IngressError;
use super::AppState;
use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Requests whose timestamp is further than this from now are rejected.
pub const MAX_REQUEST_AGE_SECS: i64 = 5 * 60;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Axum middleware for the Slack routes.
///
/// Passes requests through untouched when no signing secret is configured,
/// which `Config::validate` only allows in stub mode.
pub async fn verify_slack_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, IngressError> {
    let Some(secret) = state.signing_secret.as_deref() else {
        return Ok(next.run(request).await);
    };

    let (parts, body) = request.into_parts();
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| IngressError::MalformedPayload(e.to_string()))?;

    verify(secret, &parts.headers, &body, Utc::now().timestamp()).inspect_err(|e| {
        warn!(path = %parts.uri.path(), "Rejected Slack request: {}", e);
    })?;

    Ok(next.run(Request::from_parts(parts, Body::from(body))).await)
}

/// Checks the signature headers against `body`, with `now` in Unix seconds.
pub fn verify(secret: &str, headers: &HeaderMap, body: &[u8], now: i64) -> Result<(), IngressError> {
    let timestamp = header(headers, TIMESTAMP_HEADER)?;
    let signature = header(headers, SIGNATURE_HEADER)?;

    let sent_at: i64 = timestamp
        .parse()
        .map_err(|_| IngressError::Unauthorized("invalid request timestamp"))?;
    if (now - sent_at).abs() > MAX_REQUEST_AGE_SECS {
        return Err(IngressError::Unauthorized("request timestamp too old"));
    }

    let expected = signature
        .strip_prefix("v0=")
        .and_then(|digest| hex::decode(digest).ok())
        .ok_or(IngressError::Unauthorized("malformed signature"))?;

    // verify_slice compares in constant time.
    mac(secret, timestamp, body)?
        .verify_slice(&expected)
        .map_err(|_| IngressError::Unauthorized("signature mismatch"))
}

/// Produces the `X-Slack-Signature` value Slack would send for `body`.
#[cfg(any(test, feature = "test-utils"))]
pub fn sign(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let mac = mac(secret, &timestamp.to_string(), body).expect("HMAC accepts any key length");
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}

fn mac(secret: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, IngressError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| IngressError::Unauthorized("unusable signing secret"))?;
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, IngressError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(IngressError::Unauthorized("missing signature headers"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use axum::middleware;
    use axum::routing::post;
    use axum::Router;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const NOW: i64 = 1_531_420_618;
    const BODY: &[u8] = b"command=%2Falert&user_id=U1&text=api+high+down";

    fn signed_headers(timestamp: i64, signature: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from(timestamp));
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(signature).unwrap());
        headers
    }

    #[test]
    fn test_valid_signature_is_accepted() {
        let headers = signed_headers(NOW, &sign(SECRET, NOW, BODY));
        assert_eq!(verify(SECRET, &headers, BODY, NOW + 10), Ok(()));
    }

    #[test]
    fn test_tampered_body_or_wrong_secret_is_rejected() {
        let headers = signed_headers(NOW, &sign(SECRET, NOW, BODY));
        assert_eq!(
            verify(SECRET, &headers, b"command=%2Falert&user_id=U2", NOW),
            Err(IngressError::Unauthorized("signature mismatch"))
        );
        assert_eq!(
            verify("another-secret", &headers, BODY, NOW),
            Err(IngressError::Unauthorized("signature mismatch"))
        );
    }

    #[test]
    fn test_stale_timestamp_is_rejected_even_when_signed() {
        let sent_at = NOW - MAX_REQUEST_AGE_SECS - 1;
        let headers = signed_headers(sent_at, &sign(SECRET, sent_at, BODY));
        assert_eq!(
            verify(SECRET, &headers, BODY, NOW),
            Err(IngressError::Unauthorized("request timestamp too old"))
        );
    }

    #[test]
    fn test_missing_or_malformed_headers_are_rejected() {
        assert_eq!(
            verify(SECRET, &HeaderMap::new(), BODY, NOW),
            Err(IngressError::Unauthorized("missing signature headers"))
        );
        let headers = signed_headers(NOW, "v1=abcd");
        assert_eq!(
            verify(SECRET, &headers, BODY, NOW),
            Err(IngressError::Unauthorized("malformed signature"))
        );
    }

    fn test_router(signing_secret: Option<&str>) -> Router {
        use crate::notification::test_utils::RecordingSink;
        use crate::service::AlertService;
        use crate::store::AlertStore;

        let state = AppState {
            service: Arc::new(AlertService::new(
                Arc::new(AlertStore::new()),
                Arc::new(RecordingSink::new()),
            )),
            stub_mode: true,
            alert_channel: "alerts".to_string(),
            default_list_limit: 50,
            signing_secret: signing_secret.map(str::to_string),
            prometheus: None,
        };
        // Echoes the body so tests can see it survived the middleware.
        Router::new()
            .route("/slack/commands", post(|body: String| async move { body }))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                verify_slack_signature,
            ))
            .with_state(state)
    }

    fn request(timestamp: i64, signature: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/slack/commands")
            .header(TIMESTAMP_HEADER, timestamp)
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(BODY))
            .unwrap()
    }

    #[tokio::test]
    async fn test_middleware_forwards_signed_body() {
        let now = Utc::now().timestamp();
        let resp = test_router(Some(SECRET))
            .oneshot(request(now, &sign(SECRET, now, BODY)))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], BODY);
    }

    #[tokio::test]
    async fn test_middleware_rejects_bad_signature_with_json_error() {
        let now = Utc::now().timestamp();
        let resp = test_router(Some(SECRET))
            .oneshot(request(now, &sign("wrong", now, BODY)))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Invalid Slack request: signature mismatch");
    }

    #[tokio::test]
    async fn test_middleware_rejects_old_timestamp() {
        let sent_at = Utc::now().timestamp() - 10 * 60;
        let resp = test_router(Some(SECRET))
            .oneshot(request(sent_at, &sign(SECRET, sent_at, BODY)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_middleware_passes_through_without_secret() {
        let resp = test_router(None)
            .oneshot(request(0, "v0=00"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
