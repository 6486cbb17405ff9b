//! Push subscription API endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{json_body, ApiResponse, ApiResult};
use crate::auth::Claims;
use crate::errors::AppError;
use crate::models::{
    PushSubscription, Record, SubscribeRequest, SubscriptionKeys, UnsubscribeRequest,
};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    pub public_key: String,
}

/// GET /api/push/public-key - VAPID key browsers need to subscribe.
pub async fn push_public_key(State(state): State<AppState>) -> ApiResult<PublicKey> {
    match &state.config.vapid_public_key {
        Some(key) => Ok(ApiResponse::ok(PublicKey {
            public_key: key.clone(),
        })),
        None => Err(AppError::NotFound(
            "Push notifications are not configured".to_string(),
        )),
    }
}

/// GET /api/push/subscriptions - List the caller's subscriptions.
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Vec<Record<PushSubscription>>> {
    let subscriptions: Vec<_> = state
        .repo
        .list::<PushSubscription>()
        .await?
        .into_iter()
        .filter(|s| s.fields.admin_id == claims.sub)
        .collect();

    Ok(ApiResponse::ok(subscriptions))
}

/// POST /api/push/subscriptions - Register a browser subscription.
///
/// An endpoint that is already stored gets its keys and owner refreshed
/// instead of being duplicated.
#[tracing::instrument(skip_all, fields(admin = %claims.username))]
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> ApiResult<Record<PushSubscription>> {
    let request = json_body(payload)?;

    if let Some(existing) = state
        .repo
        .find_by::<PushSubscription>("endpoint", &request.endpoint)
        .await?
    {
        let changes = refresh_changes(&request.keys, &claims.sub)?;
        let record = state
            .repo
            .replace::<PushSubscription>(&existing.id, changes)
            .await?;
        tracing::info!(id = %record.id, "Refreshed push subscription");
        return Ok(ApiResponse::ok(record));
    }

    let record = state
        .repo
        .create(PushSubscription {
            endpoint: request.endpoint,
            keys: request.keys,
            admin_id: claims.sub,
        })
        .await?;
    tracing::info!(id = %record.id, "Registered push subscription");

    Ok(ApiResponse::created(record))
}

/// DELETE /api/push/subscriptions - Remove one of the caller's subscriptions.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<UnsubscribeRequest>, JsonRejection>,
) -> ApiResult<()> {
    let request = json_body(payload)?;

    let existing = state
        .repo
        .find_by::<PushSubscription>("endpoint", &request.endpoint)
        .await?
        .filter(|s| s.fields.admin_id == claims.sub)
        .ok_or_else(|| AppError::NotFound("Push subscription not found".to_string()))?;
    state.repo.delete::<PushSubscription>(&existing.id).await?;

    Ok(ApiResponse::message("Push subscription removed"))
}

fn refresh_changes(
    keys: &SubscriptionKeys,
    admin_id: &str,
) -> Result<Map<String, Value>, AppError> {
    let keys = serde_json::to_value(keys)?;
    let mut changes = Map::new();
    changes.insert("keys".to_string(), keys);
    changes.insert("adminId".to_string(), Value::String(admin_id.to_string()));
    Ok(changes)
}
