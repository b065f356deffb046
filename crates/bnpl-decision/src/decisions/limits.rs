use super::domain::CreditLimitTier;

/// Tier table scanned highest threshold first.
const TIER_LADDER: [CreditLimitTier; 7] = [
    CreditLimitTier::Maximum,
    CreditLimitTier::Premium,
    CreditLimitTier::Enhanced,
    CreditLimitTier::Standard,
    CreditLimitTier::Basic,
    CreditLimitTier::Entry,
    CreditLimitTier::Denied,
];

/// Map a risk score to its credit limit and tier.
///
/// The score is clamped into [0, 100] first, which makes this a total
/// function: the `Denied` floor at 0 always matches, so no fallback error
/// path exists.
pub fn score_to_credit_limit(score: i64) -> (i64, CreditLimitTier) {
    let score = score.clamp(0, 100);
    for tier in TIER_LADDER {
        if score >= tier.score_floor() {
            return (tier.limit_cents(), tier);
        }
    }
    (0, CreditLimitTier::Denied)
}

/// Amount to grant: the requested amount capped by the approved limit.
pub(crate) fn amount_granted(credit_limit_cents: i64, requested_cents: i64) -> i64 {
    credit_limit_cents.min(requested_cents)
}
