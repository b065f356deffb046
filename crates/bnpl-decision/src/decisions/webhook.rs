use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Identifier wrapper for outbound webhook records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WebhookId(pub String);

static WEBHOOK_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_webhook_id() -> WebhookId {
    let id = WEBHOOK_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    WebhookId(format!("wh-{id:06}"))
}

/// Delivery state of an outbound notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    Pending,
    Delivered,
    Failed,
}

/// A notification queued for delivery to an external system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundWebhook {
    pub id: WebhookId,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub target_url: String,
    pub status: WebhookStatus,
    pub attempts: u32,
}

/// Persistence seam for webhook records.
pub trait WebhookStore: Send + Sync {
    fn insert(&self, record: OutboundWebhook) -> Result<(), WebhookError>;
    fn update(&self, record: OutboundWebhook) -> Result<(), WebhookError>;
    /// Records still pending with remaining attempts.
    fn pending(&self, max_attempts: u32) -> Result<Vec<OutboundWebhook>, WebhookError>;
}

/// Delivery seam: POST the payload, return the HTTP status code.
pub trait WebhookTransport: Send + Sync {
    fn post(&self, target_url: &str, payload: &serde_json::Value) -> Result<u16, WebhookError>;
}

/// Delivery attempt cap; a record that exhausts it is marked `Failed`.
pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("webhook store unavailable: {0}")]
    Store(String),
    #[error("webhook transport error: {0}")]
    Transport(String),
}

/// Outbound webhook queue with bounded, non-blocking retry.
///
/// Delivery is fire-and-forget from the caller's perspective: `enqueue`
/// reports whether the first attempt landed but never surfaces an error to
/// the decision path. A record stays `Pending` until it is delivered or has
/// consumed all attempts, at which point it is marked `Failed`.
pub struct WebhookQueue<S, T> {
    store: Arc<S>,
    transport: Arc<T>,
    target_url: String,
}

impl<S, T> WebhookQueue<S, T>
where
    S: WebhookStore,
    T: WebhookTransport,
{
    pub fn new(store: Arc<S>, transport: Arc<T>, target_url: String) -> Self {
        Self {
            store,
            transport,
            target_url,
        }
    }

    /// Queue a notification and attempt immediate delivery.
    pub fn enqueue(&self, event_type: &str, payload: serde_json::Value) -> bool {
        let record = OutboundWebhook {
            id: next_webhook_id(),
            event_type: event_type.to_string(),
            payload,
            target_url: self.target_url.clone(),
            status: WebhookStatus::Pending,
            attempts: 0,
        };

        if let Err(err) = self.store.insert(record.clone()) {
            warn!(webhook_id = %record.id.0, error = %err, "webhook enqueue failed");
            return false;
        }

        self.deliver(record)
    }

    /// Retry every pending record with attempts to spare; returns how many
    /// were delivered.
    pub fn retry_pending(&self) -> usize {
        let pending = match self.store.pending(MAX_ATTEMPTS) {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "webhook store unavailable during retry");
                return 0;
            }
        };

        let total = pending.len();
        let delivered = pending
            .into_iter()
            .filter(|record| self.deliver(record.clone()))
            .count();

        info!(total, delivered, "pending webhooks retried");
        delivered
    }

    fn deliver(&self, mut record: OutboundWebhook) -> bool {
        record.attempts += 1;

        let delivered = match self.transport.post(&record.target_url, &record.payload) {
            Ok(status) if status < 400 => {
                record.status = WebhookStatus::Delivered;
                info!(webhook_id = %record.id.0, status, "webhook delivered");
                true
            }
            Ok(status) => {
                record.status = exhausted_status(record.attempts);
                warn!(
                    webhook_id = %record.id.0,
                    status,
                    attempts = record.attempts,
                    "webhook delivery rejected"
                );
                false
            }
            Err(err) => {
                record.status = exhausted_status(record.attempts);
                warn!(
                    webhook_id = %record.id.0,
                    error = %err,
                    attempts = record.attempts,
                    "webhook request error"
                );
                false
            }
        };

        if let Err(err) = self.store.update(record.clone()) {
            warn!(webhook_id = %record.id.0, error = %err, "webhook state update failed");
        }

        delivered
    }
}

fn exhausted_status(attempts: u32) -> WebhookStatus {
    if attempts >= MAX_ATTEMPTS {
        WebhookStatus::Failed
    } else {
        WebhookStatus::Pending
    }
}
