use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::decisions::domain::{Transaction, TransactionKind, UserId};
use crate::decisions::repository::{
    DecisionRecord, DecisionRepository, PlanId, PlanRecord, RepositoryError,
};
use crate::decisions::scoring::ScoringEngine;
use crate::decisions::service::DecisionService;
use crate::decisions::source::{SourceError, TransactionSource};
use crate::decisions::webhook::{OutboundWebhook, WebhookError, WebhookStatus, WebhookStore, WebhookTransport};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Fixed "now" used across tests so windows never shift under the suite.
pub(super) fn today() -> NaiveDate {
    date(2026, 8, 30)
}

pub(super) fn credit(date: NaiveDate, amount_cents: i64, balance_cents: i64) -> Transaction {
    transaction(date, amount_cents, TransactionKind::Credit, balance_cents, false)
}

pub(super) fn debit(date: NaiveDate, amount_cents: i64, balance_cents: i64) -> Transaction {
    transaction(date, amount_cents, TransactionKind::Debit, balance_cents, false)
}

pub(super) fn nsf_debit(date: NaiveDate, amount_cents: i64, balance_cents: i64) -> Transaction {
    transaction(date, amount_cents, TransactionKind::Debit, balance_cents, true)
}

pub(super) fn transaction(
    date: NaiveDate,
    amount_cents: i64,
    kind: TransactionKind,
    balance_cents: i64,
    nsf: bool,
) -> Transaction {
    Transaction {
        transaction_id: format!("txn-{date}-{amount_cents}"),
        date,
        amount_cents,
        kind,
        description: "test transaction".to_string(),
        category: "shopping".to_string(),
        merchant: Some("Test Merchant".to_string()),
        balance_cents,
        nsf,
    }
}

/// A healthy 90-day history: biweekly payroll, weekly spend, comfortable
/// balance, > 30 transactions. Scores into the upper tiers.
pub(super) fn strong_history() -> Vec<Transaction> {
    let mut transactions = Vec::new();
    let mut balance = 150_000;
    let start = today() - chrono::Duration::days(84);

    for week in 0..12 {
        let monday = start + chrono::Duration::days(week * 7);
        if week % 2 == 0 {
            balance += 120_000;
            transactions.push(credit(monday, 120_000, balance));
        }
        for offset in [1, 3, 5] {
            balance -= 15_000;
            transactions.push(debit(monday + chrono::Duration::days(offset), 15_000, balance));
        }
    }

    transactions
}

pub(super) fn user() -> UserId {
    UserId("user-123".to_string())
}

#[derive(Default, Clone)]
pub(super) struct MemorySource {
    pub(super) transactions: Arc<Mutex<HashMap<UserId, Vec<Transaction>>>>,
    pub(super) failure: Arc<Mutex<Option<SourceError>>>,
}

impl MemorySource {
    pub(super) fn with_history(user_id: UserId, transactions: Vec<Transaction>) -> Self {
        let source = Self::default();
        source
            .transactions
            .lock()
            .expect("source mutex poisoned")
            .insert(user_id, transactions);
        source
    }

    pub(super) fn failing(error: SourceError) -> Self {
        let source = Self::default();
        *source.failure.lock().expect("source mutex poisoned") = Some(error);
        source
    }
}

impl TransactionSource for MemorySource {
    fn fetch(&self, user_id: &UserId) -> Result<Vec<Transaction>, SourceError> {
        if let Some(error) = self.failure.lock().expect("source mutex poisoned").take() {
            return Err(error);
        }
        self.transactions
            .lock()
            .expect("source mutex poisoned")
            .get(user_id)
            .cloned()
            .ok_or(SourceError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) decisions: Arc<Mutex<Vec<DecisionRecord>>>,
    pub(super) plans: Arc<Mutex<HashMap<PlanId, PlanRecord>>>,
}

impl DecisionRepository for MemoryRepository {
    fn insert_decision(&self, record: DecisionRecord) -> Result<(), RepositoryError> {
        self.decisions
            .lock()
            .expect("repository mutex poisoned")
            .push(record);
        Ok(())
    }

    fn insert_plan(&self, record: PlanRecord) -> Result<(), RepositoryError> {
        let mut guard = self.plans.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch_plan(&self, id: &PlanId) -> Result<Option<PlanRecord>, RepositoryError> {
        let guard = self.plans.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn history(&self, user_id: &UserId) -> Result<Vec<DecisionRecord>, RepositoryError> {
        let guard = self.decisions.lock().expect("repository mutex poisoned");
        let mut records: Vec<DecisionRecord> = guard
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect();
        records.reverse();
        Ok(records)
    }
}

pub(super) struct UnavailableRepository;

impl DecisionRepository for UnavailableRepository {
    fn insert_decision(&self, _record: DecisionRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_plan(&self, _record: PlanRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_plan(&self, _id: &PlanId) -> Result<Option<PlanRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn history(&self, _user_id: &UserId) -> Result<Vec<DecisionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryWebhookStore {
    pub(super) records: Arc<Mutex<Vec<OutboundWebhook>>>,
}

impl MemoryWebhookStore {
    pub(super) fn records(&self) -> Vec<OutboundWebhook> {
        self.records.lock().expect("webhook mutex poisoned").clone()
    }
}

impl WebhookStore for MemoryWebhookStore {
    fn insert(&self, record: OutboundWebhook) -> Result<(), WebhookError> {
        self.records
            .lock()
            .expect("webhook mutex poisoned")
            .push(record);
        Ok(())
    }

    fn update(&self, record: OutboundWebhook) -> Result<(), WebhookError> {
        let mut guard = self.records.lock().expect("webhook mutex poisoned");
        if let Some(existing) = guard.iter_mut().find(|existing| existing.id == record.id) {
            *existing = record;
        }
        Ok(())
    }

    fn pending(&self, max_attempts: u32) -> Result<Vec<OutboundWebhook>, WebhookError> {
        let guard = self.records.lock().expect("webhook mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| {
                record.status == WebhookStatus::Pending && record.attempts < max_attempts
            })
            .cloned()
            .collect())
    }
}

/// Transport returning a scripted sequence of responses, then 200s.
#[derive(Default, Clone)]
pub(super) struct ScriptedTransport {
    pub(super) responses: Arc<Mutex<Vec<Result<u16, String>>>>,
    pub(super) posts: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl ScriptedTransport {
    pub(super) fn always_ok() -> Self {
        Self::default()
    }

    pub(super) fn scripted(responses: Vec<Result<u16, String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            posts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(super) fn posts(&self) -> Vec<serde_json::Value> {
        self.posts.lock().expect("transport mutex poisoned").clone()
    }
}

impl WebhookTransport for ScriptedTransport {
    fn post(&self, _target_url: &str, payload: &serde_json::Value) -> Result<u16, WebhookError> {
        self.posts
            .lock()
            .expect("transport mutex poisoned")
            .push(payload.clone());
        let mut responses = self.responses.lock().expect("transport mutex poisoned");
        if responses.is_empty() {
            Ok(200)
        } else {
            responses.remove(0).map_err(WebhookError::Transport)
        }
    }
}

pub(super) fn build_service(
    source: MemorySource,
) -> (
    DecisionService<MemorySource, MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = DecisionService::new(
        Arc::new(source),
        repository.clone(),
        ScoringEngine::default(),
    );
    (service, repository)
}
