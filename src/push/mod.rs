//! Client for the third-party push-notification relay.
//!
//! The relay owns Web Push encryption and delivery; this side only forwards
//! the stored browser subscription together with the notification payload.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::db::Repository;
use crate::models::PushSubscription;

const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Payload shown by the browser's notification.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Outcome of a single delivery attempt that reached the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The browser endpoint no longer exists; the subscription should be dropped.
    Gone,
}

#[derive(Debug)]
pub enum PushError {
    Transport(reqwest::Error),
    Rejected(StatusCode),
}

impl std::fmt::Display for PushError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushError::Transport(err) => write!(f, "push relay unreachable: {}", err),
            PushError::Rejected(status) => write!(f, "push relay rejected request: {}", status),
        }
    }
}

impl std::error::Error for PushError {}

impl From<reqwest::Error> for PushError {
    fn from(err: reqwest::Error) -> Self {
        PushError::Transport(err)
    }
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    subscription: RelaySubscription<'a>,
    notification: &'a Notification,
}

#[derive(Serialize)]
struct RelaySubscription<'a> {
    endpoint: &'a str,
    keys: &'a crate::models::SubscriptionKeys,
}

/// HTTP client for the push relay. Disabled when no relay URL is configured.
#[derive(Clone)]
pub struct PushRelay {
    client: Client,
    relay_url: Option<String>,
    api_key: Option<String>,
}

impl PushRelay {
    pub fn new(relay_url: Option<String>, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(RELAY_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default push relay client: {}", e);
                Client::new()
            });
        Self {
            client,
            relay_url,
            api_key,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.relay_url.is_some()
    }

    /// Forward one notification to one subscription.
    pub async fn deliver(
        &self,
        subscription: &PushSubscription,
        notification: &Notification,
    ) -> Result<Delivery, PushError> {
        let Some(url) = &self.relay_url else {
            return Ok(Delivery::Sent);
        };

        let body = RelayRequest {
            subscription: RelaySubscription {
                endpoint: &subscription.endpoint,
                keys: &subscription.keys,
            },
            notification,
        };

        let mut request = self.client.post(url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => Ok(Delivery::Sent),
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(Delivery::Gone),
            status => Err(PushError::Rejected(status)),
        }
    }
}

/// Relay a notification to every stored subscription, one at a time.
///
/// Never fails: delivery errors are logged, and subscriptions the relay
/// reports as gone are deleted.
pub async fn notify_admins(repo: &Repository, relay: &PushRelay, notification: &Notification) {
    if !relay.is_enabled() {
        tracing::debug!("No push relay configured, skipping notification");
        return;
    }

    let subscriptions = match repo.list::<PushSubscription>().await {
        Ok(subscriptions) => subscriptions,
        Err(e) => {
            tracing::warn!("Failed to load push subscriptions: {}", e);
            return;
        }
    };

    for subscription in subscriptions {
        match relay.deliver(&subscription.fields, notification).await {
            Ok(Delivery::Sent) => {
                tracing::debug!(subscription_id = %subscription.id, "Push notification relayed");
            }
            Ok(Delivery::Gone) => {
                tracing::info!(
                    subscription_id = %subscription.id,
                    "Removing expired push subscription"
                );
                if let Err(e) = repo.delete::<PushSubscription>(&subscription.id).await {
                    tracing::warn!("Failed to remove push subscription {}: {}", subscription.id, e);
                }
            }
            Err(e) => {
                tracing::warn!(
                    subscription_id = %subscription.id,
                    "Push notification failed: {}",
                    e
                );
            }
        }
    }
}
