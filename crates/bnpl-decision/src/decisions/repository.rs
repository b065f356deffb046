use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{CreditLimitTier, RepaymentPlan, RiskFactors, UserId};

/// Identifier wrapper for persisted decisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub String);

/// Identifier wrapper for persisted repayment plans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(pub String);

/// Repository record for a single approval/denial decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: DecisionId,
    pub user_id: UserId,
    pub requested_cents: i64,
    pub approved: bool,
    pub credit_limit_cents: i64,
    pub amount_granted_cents: i64,
    pub score_total: i64,
    pub score_tier: CreditLimitTier,
    pub factors: RiskFactors,
    pub decided_on: NaiveDate,
}

/// Repository record tying a repayment plan to its decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: PlanId,
    pub decision_id: DecisionId,
    pub user_id: UserId,
    pub plan: RepaymentPlan,
    pub created_on: NaiveDate,
}

impl PlanRecord {
    pub fn view(&self) -> PlanView {
        PlanView {
            plan_id: self.id.clone(),
            user_id: self.user_id.clone(),
            total_cents: self.plan.total_cents,
            created_on: self.created_on,
            installments: self
                .plan
                .installments
                .iter()
                .map(|installment| InstallmentView {
                    due_date: installment.due_date,
                    amount_cents: installment.amount_cents,
                    status: installment.status.label(),
                })
                .collect(),
        }
    }
}

/// Storage abstraction so the decision service can be exercised in isolation.
pub trait DecisionRepository: Send + Sync {
    fn insert_decision(&self, record: DecisionRecord) -> Result<(), RepositoryError>;
    fn insert_plan(&self, record: PlanRecord) -> Result<(), RepositoryError>;
    fn fetch_plan(&self, id: &PlanId) -> Result<Option<PlanRecord>, RepositoryError>;
    /// Decisions for a user, newest first.
    fn history(&self, user_id: &UserId) -> Result<Vec<DecisionRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized plan representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
    pub plan_id: PlanId,
    pub user_id: UserId,
    pub total_cents: i64,
    pub created_on: NaiveDate,
    pub installments: Vec<InstallmentView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallmentView {
    pub due_date: NaiveDate,
    pub amount_cents: i64,
    pub status: &'static str,
}

/// Single entry in a user's decision history.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionHistoryItem {
    pub decision_id: DecisionId,
    pub requested_cents: i64,
    pub approved: bool,
    pub credit_limit_cents: i64,
    pub amount_granted_cents: i64,
    pub risk_score: i64,
    pub score_tier: &'static str,
    pub decided_on: NaiveDate,
}

impl DecisionRecord {
    pub fn history_item(&self) -> DecisionHistoryItem {
        DecisionHistoryItem {
            decision_id: self.id.clone(),
            requested_cents: self.requested_cents,
            approved: self.approved,
            credit_limit_cents: self.credit_limit_cents,
            amount_granted_cents: self.amount_granted_cents,
            risk_score: self.score_total,
            score_tier: self.score_tier.label(),
            decided_on: self.decided_on,
        }
    }
}
