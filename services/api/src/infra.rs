use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;

use bnpl_decision::decisions::repository::{
    DecisionRecord, DecisionRepository, PlanId, PlanRecord, RepositoryError,
};
use bnpl_decision::decisions::source::{SourceError, TransactionSource};
use bnpl_decision::decisions::webhook::{
    OutboundWebhook, WebhookError, WebhookStatus, WebhookStore, WebhookTransport,
};
use bnpl_decision::decisions::{Transaction, UserId};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Bank API client fetching a user's transaction history over HTTP.
///
/// Blocking by design; callers hop off the async runtime before invoking it.
pub(crate) struct HttpTransactionSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TransactionsEnvelope {
    transactions: Vec<Transaction>,
}

impl HttpTransactionSource {
    pub(crate) fn new(base_url: String) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| SourceError::Transport(err.to_string()))?;
        Ok(Self { client, base_url })
    }
}

impl TransactionSource for HttpTransactionSource {
    fn fetch(&self, user_id: &UserId) -> Result<Vec<Transaction>, SourceError> {
        let url = format!(
            "{}/users/{}/transactions",
            self.base_url.trim_end_matches('/'),
            user_id.0
        );
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| SourceError::Transport(err.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound);
        }
        if !status.is_success() {
            return Err(SourceError::Upstream {
                status: status.as_u16(),
                detail: response.text().unwrap_or_default(),
            });
        }

        let envelope: TransactionsEnvelope = response
            .json()
            .map_err(|err| SourceError::Transport(err.to_string()))?;
        Ok(envelope.transactions)
    }
}

/// Ledger notification transport posting webhook payloads over HTTP.
pub(crate) struct HttpWebhookTransport {
    client: reqwest::blocking::Client,
}

impl HttpWebhookTransport {
    pub(crate) fn new() -> Result<Self, WebhookError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|err| WebhookError::Transport(err.to_string()))?;
        Ok(Self { client })
    }
}

impl WebhookTransport for HttpWebhookTransport {
    fn post(&self, target_url: &str, payload: &serde_json::Value) -> Result<u16, WebhookError> {
        let response = self
            .client
            .post(target_url)
            .json(payload)
            .send()
            .map_err(|err| WebhookError::Transport(err.to_string()))?;
        Ok(response.status().as_u16())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDecisionRepository {
    decisions: Arc<Mutex<Vec<DecisionRecord>>>,
    plans: Arc<Mutex<HashMap<PlanId, PlanRecord>>>,
}

impl DecisionRepository for InMemoryDecisionRepository {
    fn insert_decision(&self, record: DecisionRecord) -> Result<(), RepositoryError> {
        let mut guard = self.decisions.lock().map_err(poisoned)?;
        guard.push(record);
        Ok(())
    }

    fn insert_plan(&self, record: PlanRecord) -> Result<(), RepositoryError> {
        let mut guard = self.plans.lock().map_err(poisoned)?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch_plan(&self, id: &PlanId) -> Result<Option<PlanRecord>, RepositoryError> {
        let guard = self.plans.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }

    fn history(&self, user_id: &UserId) -> Result<Vec<DecisionRecord>, RepositoryError> {
        let guard = self.decisions.lock().map_err(poisoned)?;
        let mut records: Vec<DecisionRecord> = guard
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect();
        records.reverse();
        Ok(records)
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("repository mutex poisoned".to_string())
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryWebhookStore {
    records: Arc<Mutex<Vec<OutboundWebhook>>>,
}

impl WebhookStore for InMemoryWebhookStore {
    fn insert(&self, record: OutboundWebhook) -> Result<(), WebhookError> {
        let mut guard = self.records.lock().map_err(store_poisoned)?;
        guard.push(record);
        Ok(())
    }

    fn update(&self, record: OutboundWebhook) -> Result<(), WebhookError> {
        let mut guard = self.records.lock().map_err(store_poisoned)?;
        if let Some(existing) = guard.iter_mut().find(|existing| existing.id == record.id) {
            *existing = record;
        }
        Ok(())
    }

    fn pending(&self, max_attempts: u32) -> Result<Vec<OutboundWebhook>, WebhookError> {
        let guard = self.records.lock().map_err(store_poisoned)?;
        Ok(guard
            .iter()
            .filter(|record| {
                record.status == WebhookStatus::Pending && record.attempts < max_attempts
            })
            .cloned()
            .collect())
    }
}

fn store_poisoned<T>(_: std::sync::PoisonError<T>) -> WebhookError {
    WebhookError::Store("webhook mutex poisoned".to_string())
}
