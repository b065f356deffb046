use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for the account holder a decision is made for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Direction of a posted bank transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

/// A single posted bank transaction as reported by the transaction source.
///
/// Amounts are signed-magnitude: `amount_cents` is always non-negative and
/// `kind` carries the direction. `balance_cents` is the running account
/// balance *after* this transaction posts; same-day transactions keep their
/// reported order, which defines the end-of-day balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub amount_cents: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub merchant: Option<String>,
    pub balance_cents: i64,
    #[serde(default)]
    pub nsf: bool,
}

/// Factors permitted in the scoring rubric; used to label score components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactorKind {
    AvgDailyBalance,
    IncomeRatio,
    NsfHistory,
    IncomeRegularity,
    TransactionDepth,
}

/// Statistics derived from the windowed transaction history.
///
/// Computed fresh per decision and never mutated afterwards. Monetary sums
/// are integer cents; the daily-balance average and the two ratios are the
/// only floating-point values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub avg_daily_balance_cents: f64,
    /// Total credits / total debits; 0.0 when there are no debits.
    pub income_ratio: f64,
    pub nsf_count: u32,
    pub negative_balance_days: u32,
    pub transaction_count: u32,
    /// Gap-regularity of income dates in [0, 1]; higher is more regular.
    pub income_regularity: f64,
}

impl RiskFactors {
    /// The all-zero factors used for empty or fully filtered histories.
    pub fn zeroed() -> Self {
        Self {
            avg_daily_balance_cents: 0.0,
            income_ratio: 0.0,
            nsf_count: 0,
            negative_balance_days: 0,
            transaction_count: 0,
            income_regularity: 0.0,
        }
    }

    /// Average daily balance in dollars, rounded for reporting.
    pub fn avg_daily_balance_dollars(&self) -> f64 {
        round2(self.avg_daily_balance_cents / 100.0)
    }

    pub fn income_ratio_reported(&self) -> f64 {
        round2(self.income_ratio)
    }

    pub fn income_regularity_reported(&self) -> f64 {
        round2(self.income_regularity)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Credit limit tiers, totally ordered by score threshold and limit amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditLimitTier {
    Denied,
    Entry,
    Basic,
    Standard,
    Enhanced,
    Premium,
    Maximum,
}

impl CreditLimitTier {
    pub const fn label(self) -> &'static str {
        match self {
            CreditLimitTier::Denied => "denied",
            CreditLimitTier::Entry => "entry",
            CreditLimitTier::Basic => "basic",
            CreditLimitTier::Standard => "standard",
            CreditLimitTier::Enhanced => "enhanced",
            CreditLimitTier::Premium => "premium",
            CreditLimitTier::Maximum => "maximum",
        }
    }

    /// Fixed limit for the tier, in cents.
    pub const fn limit_cents(self) -> i64 {
        match self {
            CreditLimitTier::Denied => 0,
            CreditLimitTier::Entry => 10_000,
            CreditLimitTier::Basic => 20_000,
            CreditLimitTier::Standard => 30_000,
            CreditLimitTier::Enhanced => 40_000,
            CreditLimitTier::Premium => 50_000,
            CreditLimitTier::Maximum => 60_000,
        }
    }

    /// Inclusive score lower bound for the tier.
    pub const fn score_floor(self) -> i64 {
        match self {
            CreditLimitTier::Denied => 0,
            CreditLimitTier::Entry => 20,
            CreditLimitTier::Basic => 40,
            CreditLimitTier::Standard => 55,
            CreditLimitTier::Enhanced => 65,
            CreditLimitTier::Premium => 75,
            CreditLimitTier::Maximum => 85,
        }
    }
}

/// Lifecycle of an installment; the builder always starts at `Scheduled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Scheduled,
    Paid,
    Missed,
}

impl InstallmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InstallmentStatus::Scheduled => "scheduled",
            InstallmentStatus::Paid => "paid",
            InstallmentStatus::Missed => "missed",
        }
    }
}

/// A single scheduled repayment within a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub due_date: NaiveDate,
    pub amount_cents: i64,
    pub status: InstallmentStatus,
}

/// Ordered repayment schedule for a granted amount.
///
/// Invariant: the installment amounts sum to `total_cents` exactly, with any
/// rounding remainder absorbed by the final installment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentPlan {
    pub total_cents: i64,
    pub installments: Vec<Installment>,
}
