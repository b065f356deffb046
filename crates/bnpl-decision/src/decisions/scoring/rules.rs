use super::super::domain::{RiskFactorKind, RiskFactors};
use super::config::ScoringConfig;
use super::ScoreComponent;

/// Convert factors into per-component point contributions.
///
/// Returns the audit trail and the raw sum; the caller applies the final
/// clamp to [0, 100] after the thin-file penalty is in.
pub(crate) fn score_factors(
    factors: &RiskFactors,
    config: &ScoringConfig,
) -> (Vec<ScoreComponent>, i64) {
    let mut components = Vec::with_capacity(5);
    let mut total: i64 = 0;

    let balance_dollars = factors.avg_daily_balance_cents / 100.0;
    let balance_points = band_for(&config.balance_bands, balance_dollars)
        .unwrap_or(config.balance_negative_points);
    components.push(ScoreComponent {
        factor: RiskFactorKind::AvgDailyBalance,
        points: balance_points,
        notes: format!("avg daily balance ${balance_dollars:.2}"),
    });
    total += balance_points;

    let ratio_points = band_for(&config.income_ratio_bands, factors.income_ratio).unwrap_or(0);
    components.push(ScoreComponent {
        factor: RiskFactorKind::IncomeRatio,
        points: ratio_points,
        notes: format!("income ratio {:.2}", factors.income_ratio),
    });
    total += ratio_points;

    let nsf_points = if factors.nsf_count == 0 {
        config.nsf_clean_points
    } else {
        count_band_for(&config.nsf_bands, factors.nsf_count).unwrap_or(config.nsf_clean_points)
    };
    components.push(ScoreComponent {
        factor: RiskFactorKind::NsfHistory,
        points: nsf_points,
        notes: format!("{} nsf event(s)", factors.nsf_count),
    });
    total += nsf_points;

    let regularity_points =
        band_for(&config.regularity_bands, factors.income_regularity).unwrap_or(0);
    components.push(ScoreComponent {
        factor: RiskFactorKind::IncomeRegularity,
        points: regularity_points,
        notes: format!("income regularity {:.2}", factors.income_regularity),
    });
    total += regularity_points;

    let thin_file_points = count_band_for(&config.thin_file_bands, factors.transaction_count)
        .unwrap_or(config.thin_file_floor_penalty);
    components.push(ScoreComponent {
        factor: RiskFactorKind::TransactionDepth,
        points: thin_file_points,
        notes: format!("{} transaction(s) in window", factors.transaction_count),
    });
    total += thin_file_points;

    (components, total)
}

/// First band whose inclusive lower bound the value meets, highest first.
fn band_for(bands: &[(f64, i64)], value: f64) -> Option<i64> {
    bands
        .iter()
        .find(|(floor, _)| value >= *floor)
        .map(|(_, points)| *points)
}

fn count_band_for(bands: &[(u32, i64)], value: u32) -> Option<i64> {
    bands
        .iter()
        .find(|(floor, _)| value >= *floor)
        .map(|(_, points)| *points)
}

pub(crate) fn clamp_score(total: i64) -> i64 {
    total.clamp(0, 100)
}
