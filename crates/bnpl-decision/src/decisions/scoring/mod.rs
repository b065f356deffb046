mod config;
mod factors;
mod rules;

pub use config::ScoringConfig;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{RiskFactorKind, RiskFactors, Transaction};
use super::window::filter_to_window;

/// Stateless scorer applying the threshold tables to a transaction history.
///
/// Pure with respect to its inputs plus `now`; safe to share across
/// concurrent decisions.
pub struct ScoringEngine {
    config: ScoringConfig,
    window_days: i64,
}

impl ScoringEngine {
    pub const DEFAULT_WINDOW_DAYS: i64 = 90;

    pub fn new(config: ScoringConfig, window_days: i64) -> Self {
        Self {
            config,
            window_days,
        }
    }

    pub fn with_window(window_days: i64) -> Self {
        Self::new(ScoringConfig::default(), window_days)
    }

    /// Score a raw transaction history as of `now`.
    ///
    /// Empty input, or a window that filters everything out, yields the
    /// zeroed fail-safe score rather than an error.
    pub fn score(&self, transactions: Vec<Transaction>, now: NaiveDate) -> RiskScore {
        if transactions.is_empty() {
            warn!("no transactions found for scoring");
            return RiskScore::zeroed();
        }

        let mut windowed = filter_to_window(transactions, now, self.window_days);
        if windowed.is_empty() {
            warn!(
                window_days = self.window_days,
                "no transactions inside analysis window"
            );
            return RiskScore::zeroed();
        }

        // Stable sort: same-day transactions keep input order, which decides
        // the end-of-day balance.
        windowed.sort_by_key(|txn| txn.date);

        let factors = factors::compute_factors(&windowed);
        let (components, raw_total) = rules::score_factors(&factors, &self.config);
        let total = rules::clamp_score(raw_total);

        debug!(
            total,
            raw_total,
            transaction_count = factors.transaction_count,
            nsf_count = factors.nsf_count,
            income_ratio = factors.income_ratio,
            "risk scored"
        );

        RiskScore {
            total,
            factors,
            components,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::with_window(Self::DEFAULT_WINDOW_DAYS)
    }
}

/// Discrete contribution to a score, keeping decisions auditable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: RiskFactorKind,
    pub points: i64,
    pub notes: String,
}

/// Final risk score with its factor breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// Clamped to [0, 100] after the thin-file penalty.
    pub total: i64,
    pub factors: RiskFactors,
    pub components: Vec<ScoreComponent>,
}

impl RiskScore {
    pub fn zeroed() -> Self {
        Self {
            total: 0,
            factors: RiskFactors::zeroed(),
            components: Vec::new(),
        }
    }
}
