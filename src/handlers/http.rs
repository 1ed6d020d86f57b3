//! HTTP handlers: subscription signing, publishing and health.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::message::PublishRequest;
use crate::models::subscription::{SignedSubscription, SubscriptionRequest};
use crate::services::PubSubClient;

/// Shared application state for the bridge routes.
#[derive(Clone)]
pub struct AppState {
    pub app_key: String,
    pub client: PubSubClient,
}

impl AppState {
    pub fn new(app_key: impl Into<String>, client: PubSubClient) -> Self {
        Self {
            app_key: app_key.into(),
            client,
        }
    }
}

const HEADER_APP_KEY: &str = "x-app-key";

/// POST /api/subscriptions: sign a channel subscription for a browser.
/// Requires header: x-app-key: <app_key>.
pub async fn sign_subscription(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SubscriptionRequest>,
) -> Result<Json<SignedSubscription>, AppError> {
    require_app_key(&headers, &state.app_key)?;
    validate_channel(&body.channel)?;

    Ok(Json(state.client.sign_subscription(body)))
}

/// POST /api/publish: push a message to every browser on a channel.
/// Requires header: x-app-key: <app_key>.
pub async fn publish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<PublishRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_app_key(&headers, &state.app_key)?;
    validate_channel(&body.channel)?;

    let resp = state.client.publish_to(&body.channel, body.payload).await?;

    Ok(Json(json!({
        "ok": resp.is_success(),
        "channel": body.channel,
        "status": resp.status,
        "body": resp.body
    })))
}

fn require_app_key(headers: &HeaderMap, app_key: &str) -> AppResult<()> {
    let key = headers
        .get(HEADER_APP_KEY)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if key.is_empty() || key != app_key {
        return Err(AppError::Auth("invalid or missing x-app-key".to_string()));
    }
    Ok(())
}

/// Faye channel names are absolute paths.
pub(crate) fn validate_channel(channel: &str) -> AppResult<()> {
    if channel.len() < 2 || !channel.starts_with('/') {
        return Err(AppError::Validation(format!(
            "channel must be a path such as /chats/42, got {:?}",
            channel
        )));
    }
    Ok(())
}

/// GET /health: liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "privatepub" })),
    )
}
