//! BNPL decision pipeline: window filtering, risk factor extraction, score
//! aggregation, credit limit mapping, repayment planning, and the service
//! that orchestrates them against the transaction source and repository.

pub mod domain;
pub mod import;
pub mod limits;
pub mod plan;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;
pub mod source;
pub(crate) mod window;
pub mod webhook;

#[cfg(test)]
mod tests;

pub use domain::{
    CreditLimitTier, Installment, InstallmentStatus, RepaymentPlan, RiskFactorKind, RiskFactors,
    Transaction, TransactionKind, UserId,
};
pub use import::{read_transactions, TransactionImportError};
pub use limits::score_to_credit_limit;
pub use plan::{build_plan, PlanError};
pub use repository::{
    DecisionHistoryItem, DecisionId, DecisionRecord, DecisionRepository, PlanId, PlanView,
    RepositoryError,
};
pub use router::{
    decision_router, DecisionFactorsBody, DecisionRequestBody, DecisionResponseBody,
    HistoryResponseBody,
};
pub use scoring::{RiskScore, ScoreComponent, ScoringConfig, ScoringEngine};
pub use service::{Decision, DecisionService, DecisionServiceError};
pub use source::{SourceError, TransactionSource};
pub use webhook::{
    OutboundWebhook, WebhookError, WebhookId, WebhookQueue, WebhookStatus, WebhookStore,
    WebhookTransport, MAX_ATTEMPTS,
};
