//! Browser push subscription owned by an admin.

use serde::{Deserialize, Serialize};

use super::{require, Entity};
use crate::errors::AppError;

/// Keys the browser hands out with a push subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    /// Id of the admin that registered this subscription
    pub admin_id: String,
}

impl Entity for PushSubscription {
    const COLLECTION: &'static str = "push_subscriptions";
    const LABEL: &'static str = "Push subscription";
    const UNIQUE: &'static [&'static str] = &["endpoint"];

    fn validate(&self) -> Result<(), AppError> {
        require("endpoint", &self.endpoint)?;
        if !self.endpoint.starts_with("https://") && !self.endpoint.starts_with("http://") {
            return Err(AppError::Validation(
                "endpoint must be an http(s) URL".to_string(),
            ));
        }
        require("keys.p256dh", &self.keys.p256dh)?;
        require("keys.auth", &self.keys.auth)?;
        require("adminId", &self.admin_id)
    }
}

/// Request body for `POST /api/push/subscriptions`, as produced by
/// `PushSubscription.toJSON()` in the browser.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// Request body for `DELETE /api/push/subscriptions`.
#[derive(Debug, Clone, Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}
