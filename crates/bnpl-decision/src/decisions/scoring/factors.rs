use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::super::domain::{RiskFactors, Transaction, TransactionKind};

/// Derive every risk factor from the windowed history.
///
/// Expects `transactions` sorted ascending by date with the original
/// relative order preserved for equal dates; the caller guarantees the
/// slice is non-empty.
pub(crate) fn compute_factors(transactions: &[Transaction]) -> RiskFactors {
    RiskFactors {
        avg_daily_balance_cents: avg_daily_balance(transactions),
        income_ratio: income_ratio(transactions),
        nsf_count: nsf_events(transactions),
        negative_balance_days: negative_balance_days(transactions),
        transaction_count: transactions.len() as u32,
        income_regularity: income_regularity(transactions),
    }
}

/// Day-weighted average balance with carry-forward.
///
/// The last-seen balance per calendar day wins; every day between the first
/// and last transaction date contributes, carrying the previous resolved
/// balance across gap days. The accumulator is integer cents so sparse
/// histories cannot drift; only the final division produces a float.
fn avg_daily_balance(transactions: &[Transaction]) -> f64 {
    let mut end_of_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for txn in transactions {
        end_of_day.insert(txn.date, txn.balance_cents);
    }

    let first = transactions[0].date;
    let last = transactions[transactions.len() - 1].date;

    let mut carried = transactions[0].balance_cents;
    let mut total: i128 = 0;
    let mut days: i64 = 0;

    let mut day = first;
    loop {
        if let Some(balance) = end_of_day.get(&day) {
            carried = *balance;
        }
        total += i128::from(carried);
        days += 1;

        if day >= last {
            break;
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    total as f64 / days as f64
}

/// Total credits over total debits; zero debits yields the conservative 0.
fn income_ratio(transactions: &[Transaction]) -> f64 {
    let mut credits: i64 = 0;
    let mut debits: i64 = 0;
    for txn in transactions {
        match txn.kind {
            TransactionKind::Credit => credits += txn.amount_cents,
            TransactionKind::Debit => debits += txn.amount_cents,
        }
    }

    if debits > 0 {
        credits as f64 / debits as f64
    } else {
        0.0
    }
}

/// Count NSF events: the explicit flag, or a debit driving the running
/// balance from non-negative to negative. A balance that is already
/// negative never re-counts, and credits only count via the flag.
fn nsf_events(transactions: &[Transaction]) -> u32 {
    let mut count = 0;
    let mut prev_balance: Option<i64> = None;

    for txn in transactions {
        if txn.nsf {
            count += 1;
        } else if txn.kind == TransactionKind::Debit && txn.balance_cents < 0 {
            if matches!(prev_balance, Some(prev) if prev >= 0) {
                count += 1;
            }
        }
        prev_balance = Some(txn.balance_cents);
    }

    count
}

/// Distinct dates on which at least one posted balance was negative.
fn negative_balance_days(transactions: &[Transaction]) -> u32 {
    let dates: BTreeSet<NaiveDate> = transactions
        .iter()
        .filter(|txn| txn.balance_cents < 0)
        .map(|txn| txn.date)
        .collect();
    dates.len() as u32
}

/// Gap-statistic regularity of income dates in [0, 1].
///
/// Fewer than two distinct credit dates scores 0. Otherwise the score is
/// `max(0, 1 - cv)` where cv is the population coefficient of variation of
/// the day gaps between consecutive income dates; a zero mean gap is the
/// degenerate same-day-repeat case and scores 1.
fn income_regularity(transactions: &[Transaction]) -> f64 {
    let income_dates: BTreeSet<NaiveDate> = transactions
        .iter()
        .filter(|txn| txn.kind == TransactionKind::Credit)
        .map(|txn| txn.date)
        .collect();

    if income_dates.len() < 2 {
        return 0.0;
    }

    let ordered: Vec<NaiveDate> = income_dates.into_iter().collect();
    let gaps: Vec<f64> = ordered
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days() as f64)
        .collect();

    let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
    if mean == 0.0 {
        return 1.0;
    }

    let variance = gaps.iter().map(|gap| (gap - mean).powi(2)).sum::<f64>() / gaps.len() as f64;
    let cv = variance.sqrt() / mean;

    (1.0 - cv).max(0.0)
}
