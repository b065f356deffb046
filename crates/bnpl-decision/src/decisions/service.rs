use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{CreditLimitTier, RepaymentPlan, Transaction, UserId};
use super::limits::{amount_granted, score_to_credit_limit};
use super::plan::{build_plan, PlanError};
use super::repository::{
    DecisionHistoryItem, DecisionId, DecisionRecord, DecisionRepository, PlanId, PlanRecord,
    PlanView, RepositoryError,
};
use super::scoring::{RiskScore, ScoringEngine};
use super::source::{SourceError, TransactionSource};

static DECISION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static PLAN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_decision_id() -> DecisionId {
    let id = DECISION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DecisionId(format!("dec-{id:06}"))
}

fn next_plan_id() -> PlanId {
    let id = PLAN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PlanId(format!("plan-{id:06}"))
}

/// Orchestration output for a single decision request.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub id: DecisionId,
    pub approved: bool,
    pub credit_limit_cents: i64,
    pub amount_granted_cents: i64,
    pub tier: CreditLimitTier,
    pub plan_id: Option<PlanId>,
    pub plan: Option<RepaymentPlan>,
    pub score: RiskScore,
}

/// Service composing the transaction source, scoring engine, limit mapping,
/// plan construction, and repository.
///
/// A decision is a strictly sequential single pass: fetch, score, map to a
/// limit, decide the grant, optionally build the plan, persist. No retries,
/// no internal concurrency; the service only owns immutable configuration
/// and may be shared across requests.
pub struct DecisionService<S, R> {
    source: Arc<S>,
    repository: Arc<R>,
    engine: Arc<ScoringEngine>,
}

impl<S, R> DecisionService<S, R>
where
    S: TransactionSource + 'static,
    R: DecisionRepository + 'static,
{
    pub fn new(source: Arc<S>, repository: Arc<R>, engine: ScoringEngine) -> Self {
        Self {
            source,
            repository,
            engine: Arc::new(engine),
        }
    }

    /// Make a decision for a user as of `now`.
    ///
    /// An unknown user is the thin-file fallback and scores against an empty
    /// history; any other source failure propagates.
    pub fn decide(
        &self,
        user_id: &UserId,
        requested_cents: i64,
        now: NaiveDate,
    ) -> Result<Decision, DecisionServiceError> {
        if requested_cents <= 0 {
            return Err(DecisionServiceError::InvalidRequest(requested_cents));
        }

        let transactions = match self.source.fetch(user_id) {
            Ok(transactions) => transactions,
            Err(SourceError::NotFound) => {
                info!(user_id = %user_id.0, "user unknown to source, scoring empty history");
                Vec::new()
            }
            Err(other) => return Err(other.into()),
        };

        self.decide_with_transactions(user_id, requested_cents, transactions, now)
    }

    /// Decision pass over an already fetched history; this is the pure core.
    pub fn decide_with_transactions(
        &self,
        user_id: &UserId,
        requested_cents: i64,
        transactions: Vec<Transaction>,
        now: NaiveDate,
    ) -> Result<Decision, DecisionServiceError> {
        if requested_cents <= 0 {
            return Err(DecisionServiceError::InvalidRequest(requested_cents));
        }

        let score = self.engine.score(transactions, now);
        debug!(user_id = %user_id.0, total = score.total, "scored");

        let (credit_limit_cents, tier) = score_to_credit_limit(score.total);

        let approved = credit_limit_cents > 0;
        let amount_granted_cents = if approved {
            amount_granted(credit_limit_cents, requested_cents)
        } else {
            0
        };

        let decision_id = next_decision_id();
        self.repository.insert_decision(DecisionRecord {
            id: decision_id.clone(),
            user_id: user_id.clone(),
            requested_cents,
            approved,
            credit_limit_cents,
            amount_granted_cents,
            score_total: score.total,
            score_tier: tier,
            factors: score.factors.clone(),
            decided_on: now,
        })?;

        let mut plan_id = None;
        let mut plan = None;
        if approved && amount_granted_cents > 0 {
            let built = build_plan(amount_granted_cents, now)?;
            let id = next_plan_id();
            self.repository.insert_plan(PlanRecord {
                id: id.clone(),
                decision_id: decision_id.clone(),
                user_id: user_id.clone(),
                plan: built.clone(),
                created_on: now,
            })?;
            plan_id = Some(id);
            plan = Some(built);
        }

        info!(
            user_id = %user_id.0,
            decision_id = %decision_id.0,
            approved,
            credit_limit_cents,
            amount_granted_cents,
            risk_score = score.total,
            tier = tier.label(),
            "decision made"
        );

        Ok(Decision {
            id: decision_id,
            approved,
            credit_limit_cents,
            amount_granted_cents,
            tier,
            plan_id,
            plan,
            score,
        })
    }

    /// Fetch a repayment plan for API responses.
    pub fn plan(&self, id: &PlanId) -> Result<PlanView, DecisionServiceError> {
        let record = self
            .repository
            .fetch_plan(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record.view())
    }

    /// Decision history for a user, newest first.
    pub fn history(&self, user_id: &UserId) -> Result<Vec<DecisionHistoryItem>, DecisionServiceError> {
        let records = self.repository.history(user_id)?;
        Ok(records.iter().map(DecisionRecord::history_item).collect())
    }
}

/// Error raised by the decision service.
#[derive(Debug, thiserror::Error)]
pub enum DecisionServiceError {
    #[error("requested amount must be positive, got {0} cents")]
    InvalidRequest(i64),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Plan(#[from] PlanError),
}
